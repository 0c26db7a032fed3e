//! Error types for geotiff-pointcloud

use std::io;
use thiserror::Error;

use crate::formats::tiff::tags;

/// Result type for geotiff-pointcloud operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Every error ends the current run; the kind only tells the caller what
/// went wrong so it can be reported sensibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Underlying I/O failure
    Io,
    /// Malformed file structure
    Format,
    /// Well-formed file using an encoding we do not decode
    UnsupportedFormat,
    /// Pixel range invalid or out of bounds
    Range,
    /// A prompt was dismissed without input
    UserCancelled,
    /// The host document rejected an operation or could not be written
    Host,
}

/// Error types that can occur while importing a raster
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid file structure
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Byte order marker is neither `II` nor `MM`
    #[error("Invalid byte order marker: 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Magic number is neither 42 (TIFF) nor 43 (BigTIFF)
    #[error("Invalid TIFF magic number: {0}")]
    InvalidMagic(u16),

    /// Required tag is missing from the IFD
    #[error("Missing required tag: {name} ({tag})")]
    MissingTag { tag: u16, name: &'static str },

    /// Offset points outside the file
    #[error("Offset {0} lies outside the file")]
    InvalidOffset(u64),

    /// Number of values in a tag does not match the image layout
    #[error("Tag {name} has {actual} values, expected {expected}")]
    TagCountMismatch {
        name: &'static str,
        expected: u64,
        actual: u64,
    },

    /// World file could not be parsed
    #[error("Invalid world file at line {line}: {message}")]
    WorldFile { line: usize, message: String },

    /// Unsupported encoding or layout
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Pixel range is malformed (start after end, unparsable input)
    #[error("Invalid pixel range: {0}")]
    InvalidRange(String),

    /// Pixel coordinates outside the image
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// A prompt was dismissed
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// CSV output failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON output failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Host document failure
    #[error("Host error: {0}")]
    Host(String),
}

impl Error {
    /// Builds a [`Error::MissingTag`] with the tag's symbolic name
    pub fn missing_tag(tag: u16) -> Self {
        Error::MissingTag {
            tag,
            name: tags::tag_name(tag),
        }
    }

    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::InvalidFormat(_)
            | Error::InvalidByteOrder(_)
            | Error::InvalidMagic(_)
            | Error::MissingTag { .. }
            | Error::InvalidOffset(_)
            | Error::TagCountMismatch { .. }
            | Error::WorldFile { .. } => ErrorKind::Format,
            Error::Unsupported(_) => ErrorKind::UnsupportedFormat,
            Error::InvalidRange(_) | Error::OutOfBounds(_) => ErrorKind::Range,
            Error::Cancelled(_) => ErrorKind::UserCancelled,
            Error::Csv(_) | Error::Json(_) | Error::Host(_) => ErrorKind::Host,
        }
    }
}
