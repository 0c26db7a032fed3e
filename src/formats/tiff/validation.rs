//! Layout validation for importable rasters.
//!
//! Turns the resolved tags of the first IFD into a [`TiffImage`], rejecting
//! files outside the supported subset before any tile is touched.
//!
//! # Supported Subset
//!
//! - **Organization**: tiled only (no strips)
//! - **Compression**: none
//! - **Samples**: one 16-bit unsigned integer sample per pixel
//! - **Photometric**: grayscale (WhiteIsZero or BlackIsZero)
//!
//! Files that violate the subset fail with [`Error::Unsupported`]; files that
//! are internally inconsistent fail with one of the format errors.

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::types::Dimensions;
use super::tags::{self, compression, photometric, sample_format};
use super::types::{TiffImage, TileLocation};

/// Tag values of the first IFD that matter for decoding, resolved from the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTags {
    pub width: Option<u64>,
    pub height: Option<u64>,
    /// One value per sample; empty when the tag is absent
    pub bits_per_sample: Vec<u64>,
    pub compression: Option<u64>,
    pub photometric: Option<u64>,
    pub samples_per_pixel: Option<u64>,
    /// One value per sample; empty when the tag is absent
    pub sample_format: Vec<u64>,
    pub tile_width: Option<u64>,
    pub tile_length: Option<u64>,
    pub tile_offsets: Option<Vec<u64>>,
    pub tile_byte_counts: Option<Vec<u64>>,
    pub has_strips: bool,
}

impl ImageTags {
    fn is_tiled(&self) -> bool {
        self.tile_width.is_some() || self.tile_length.is_some() || self.tile_offsets.is_some()
    }
}

/// Rejects strip-organized files and files with incomplete tiling tags
pub fn check_tiled(image_tags: &ImageTags) -> Result<()> {
    if !image_tags.is_tiled() {
        let reason = if image_tags.has_strips {
            "file uses strips instead of tiles"
        } else {
            "file has no tiling tags"
        };
        return Err(Error::Unsupported(reason.to_string()));
    }

    if image_tags.tile_width.is_none() {
        return Err(Error::missing_tag(tags::TILE_WIDTH));
    }
    if image_tags.tile_length.is_none() {
        return Err(Error::missing_tag(tags::TILE_LENGTH));
    }
    if image_tags.tile_offsets.is_none() {
        return Err(Error::missing_tag(tags::TILE_OFFSETS));
    }
    if image_tags.tile_byte_counts.is_none() {
        return Err(Error::missing_tag(tags::TILE_BYTE_COUNTS));
    }
    Ok(())
}

/// Rejects anything but uncompressed data; an absent tag means uncompressed
pub fn check_compression(image_tags: &ImageTags) -> Result<()> {
    let value = image_tags.compression.unwrap_or(compression::NONE as u64);
    if value != compression::NONE as u64 {
        let name = u16::try_from(value)
            .map(tags::compression_name)
            .unwrap_or("Unknown");
        return Err(Error::Unsupported(format!(
            "compression {} ({}), only uncompressed data is supported",
            value, name
        )));
    }
    Ok(())
}

/// Requires exactly one 16-bit unsigned sample per pixel
pub fn check_samples(image_tags: &ImageTags) -> Result<()> {
    if image_tags.bits_per_sample.is_empty() {
        return Err(Error::missing_tag(tags::BITS_PER_SAMPLE));
    }
    if let Some(&bits) = image_tags.bits_per_sample.iter().find(|&&bits| bits != 16) {
        return Err(Error::Unsupported(format!(
            "{} bits per sample, only 16 is supported",
            bits
        )));
    }

    let samples = image_tags.samples_per_pixel.unwrap_or(1);
    if samples != 1 {
        return Err(Error::Unsupported(format!(
            "{} samples per pixel, only single-band grayscale is supported",
            samples
        )));
    }

    if let Some(&format) = image_tags
        .sample_format
        .iter()
        .find(|&&format| format != sample_format::UNSIGNED as u64)
    {
        return Err(Error::Unsupported(format!(
            "sample format {}, only unsigned integers are supported",
            format
        )));
    }
    Ok(())
}

/// Requires a grayscale photometric interpretation
pub fn check_photometric(image_tags: &ImageTags) -> Result<()> {
    match image_tags.photometric {
        None => Err(Error::missing_tag(tags::PHOTOMETRIC_INTERPRETATION)),
        Some(v)
            if v == photometric::WHITE_IS_ZERO as u64 || v == photometric::BLACK_IS_ZERO as u64 =>
        {
            Ok(())
        }
        Some(v) => Err(Error::Unsupported(format!(
            "photometric interpretation {}, only grayscale is supported",
            v
        ))),
    }
}

/// Validates the resolved tags and builds the image description
///
/// Checks run in a fixed order so that an unsupported encoding is reported
/// as such even when other parts of the file would also be rejected.
pub fn validate_layout(
    image_tags: &ImageTags,
    byte_order: ByteOrder,
    is_big_tiff: bool,
    file_len: u64,
) -> Result<TiffImage> {
    let width = image_tags.width.ok_or_else(|| Error::missing_tag(tags::IMAGE_WIDTH))?;
    let height = image_tags.height.ok_or_else(|| Error::missing_tag(tags::IMAGE_LENGTH))?;

    check_tiled(image_tags)?;
    check_compression(image_tags)?;
    check_samples(image_tags)?;
    check_photometric(image_tags)?;

    // check_tiled guarantees these are present
    let (Some(tile_width), Some(tile_length), Some(offsets), Some(byte_counts)) = (
        image_tags.tile_width,
        image_tags.tile_length,
        image_tags.tile_offsets.as_ref(),
        image_tags.tile_byte_counts.as_ref(),
    ) else {
        return Err(Error::InvalidFormat("incomplete tiling tags".to_string()));
    };

    if width == 0 || height == 0 {
        return Err(Error::InvalidFormat(format!(
            "empty image ({} x {})",
            width, height
        )));
    }
    if tile_width == 0 || tile_length == 0 {
        return Err(Error::InvalidFormat(format!(
            "invalid tile size {} x {}",
            tile_width, tile_length
        )));
    }

    let expected_tiles = width
        .div_ceil(tile_width)
        .checked_mul(height.div_ceil(tile_length))
        .ok_or_else(|| Error::InvalidFormat("tile grid too large".to_string()))?;
    if offsets.len() as u64 != expected_tiles {
        return Err(Error::TagCountMismatch {
            name: tags::tag_name(tags::TILE_OFFSETS),
            expected: expected_tiles,
            actual: offsets.len() as u64,
        });
    }
    if byte_counts.len() != offsets.len() {
        return Err(Error::TagCountMismatch {
            name: tags::tag_name(tags::TILE_BYTE_COUNTS),
            expected: offsets.len() as u64,
            actual: byte_counts.len() as u64,
        });
    }

    let tile_byte_len = tile_width
        .checked_mul(tile_length)
        .and_then(|pixels| pixels.checked_mul(TiffImage::BYTES_PER_SAMPLE))
        .ok_or_else(|| {
            Error::InvalidFormat(format!("tile size {} x {} too large", tile_width, tile_length))
        })?;

    let mut tiles = Vec::with_capacity(offsets.len());
    for (index, (&offset, &byte_count)) in offsets.iter().zip(byte_counts.iter()).enumerate() {
        let end = offset
            .checked_add(byte_count)
            .ok_or(Error::InvalidOffset(offset))?;
        if end > file_len {
            return Err(Error::InvalidOffset(offset));
        }
        if byte_count < tile_byte_len {
            return Err(Error::InvalidFormat(format!(
                "tile {} holds {} bytes, expected {}",
                index, byte_count, tile_byte_len
            )));
        }
        tiles.push(TileLocation { offset, byte_count });
    }

    let image = TiffImage {
        byte_order,
        is_big_tiff,
        dimensions: Dimensions::new(width, height),
        tile_dimensions: Dimensions::new(tile_width, tile_length),
        tiles,
    };

    debug!(
        width,
        height,
        tile_width,
        tile_length,
        tiles = image.tile_count(),
        "validated tiled 16-bit grayscale layout"
    );

    Ok(image)
}
