//! TIFF data structures

use std::fmt;

use crate::io::ByteOrder;
use crate::types::Dimensions;

/// Location of one tile's bytes in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLocation {
    /// Offset of the first byte
    pub offset: u64,
    /// Number of bytes
    pub byte_count: u64,
}

/// A validated, tiled, uncompressed 16-bit grayscale image
///
/// Built once from the first IFD by [`super::validation::validate_layout`];
/// read-only afterwards. Tiles are numbered row-major, left to right then
/// top to bottom, as in the TileOffsets tag. Validation guarantees the tile
/// grid matches `tiles`, so grid arithmetic below cannot overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct TiffImage {
    pub byte_order: ByteOrder,
    pub is_big_tiff: bool,
    pub dimensions: Dimensions,
    pub tile_dimensions: Dimensions,
    pub tiles: Vec<TileLocation>,
}

impl TiffImage {
    /// Bytes per decoded sample
    pub const BYTES_PER_SAMPLE: u64 = 2;

    /// Number of tile columns
    pub fn tiles_across(&self) -> u64 {
        self.dimensions.width.div_ceil(self.tile_dimensions.width)
    }

    /// Number of tile rows
    pub fn tiles_down(&self) -> u64 {
        self.dimensions.height.div_ceil(self.tile_dimensions.height)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Bytes an uncompressed tile occupies, including padding past the image edge
    pub fn tile_byte_len(&self) -> u64 {
        self.tile_dimensions.pixel_count() * Self::BYTES_PER_SAMPLE
    }
}

impl fmt::Display for TiffImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIFF Image:")?;
        writeln!(f, "  Format: {}", if self.is_big_tiff { "BigTIFF" } else { "TIFF" })?;
        writeln!(
            f,
            "  Byte order: {}",
            match self.byte_order {
                ByteOrder::LittleEndian => "little-endian (II)",
                ByteOrder::BigEndian => "big-endian (MM)",
            }
        )?;
        writeln!(
            f,
            "  Dimensions: {} x {}",
            self.dimensions.width, self.dimensions.height
        )?;
        writeln!(f, "  Bits per sample: {}", Self::BYTES_PER_SAMPLE * 8)?;
        writeln!(
            f,
            "  Tile size: {} x {}",
            self.tile_dimensions.width, self.tile_dimensions.height
        )?;
        writeln!(
            f,
            "  Tiles: {} ({} across, {} down)",
            self.tile_count(),
            self.tiles_across(),
            self.tiles_down()
        )
    }
}
