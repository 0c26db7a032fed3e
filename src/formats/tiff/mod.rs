//! TIFF and BigTIFF format support
//!
//! Only the subset needed for elevation imports is decoded: the first IFD of
//! a tiled, uncompressed, single-band 16-bit unsigned raster.

pub mod tags;
pub mod ifd;
pub mod types;
pub mod validation;
pub mod reader;

#[cfg(test)]
pub mod testing;

pub use ifd::{IFD, IFDEntry};
pub use types::{TiffImage, TileLocation};
pub use reader::TiffReader;
pub use validation::{validate_layout, ImageTags};

/// TIFF magic number (42)
pub const TIFF_MAGIC: u16 = 42;

/// BigTIFF magic number (43)
pub const BIGTIFF_MAGIC: u16 = 43;
