//! Pixel addressing within the tile grid

use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::formats::tiff::TiffImage;
use crate::io::ByteOrder;
use crate::types::{PixelCoord, PixelRange};

/// Handles pixel value reading and coordinate calculations
pub struct PixelReader;

impl PixelReader {
    /// Validates that pixel coordinates are within bounds
    pub fn validate_pixel_bounds(image: &TiffImage, coord: PixelCoord) -> Result<()> {
        let dims = image.dimensions;
        if coord.col >= dims.width || coord.row >= dims.height {
            return Err(Error::OutOfBounds(format!(
                "pixel {} outside image bounds ({} x {})",
                coord, dims.width, dims.height
            )));
        }
        Ok(())
    }

    /// Calculates which tile contains a pixel
    pub fn calculate_tile_index(image: &TiffImage, coord: PixelCoord) -> usize {
        let tile_row = coord.row / image.tile_dimensions.height;
        let tile_col = coord.col / image.tile_dimensions.width;
        (tile_row * image.tiles_across() + tile_col) as usize
    }

    /// Calculates the sample index of a pixel within its tile
    pub fn calculate_pixel_index(image: &TiffImage, coord: PixelCoord) -> usize {
        let tile_dims = image.tile_dimensions;
        let x = coord.col % tile_dims.width;
        let y = coord.row % tile_dims.height;
        (y * tile_dims.width + x) as usize
    }

    /// Tile rows and tile columns a range touches
    pub fn tile_span(
        image: &TiffImage,
        range: &PixelRange,
    ) -> (RangeInclusive<u64>, RangeInclusive<u64>) {
        let tile_dims = image.tile_dimensions;
        let rows = (range.start().row / tile_dims.height)..=(range.end().row / tile_dims.height);
        let cols = (range.start().col / tile_dims.width)..=(range.end().col / tile_dims.width);
        (rows, cols)
    }

    /// Indices of every tile intersecting the range, row-major
    pub fn tiles_for_range(image: &TiffImage, range: &PixelRange) -> Vec<usize> {
        let (tile_rows, tile_cols) = Self::tile_span(image, range);
        let across = image.tiles_across();
        tile_rows
            .flat_map(|row| tile_cols.clone().map(move |col| (row * across + col) as usize))
            .collect()
    }

    /// Reads a u16 sample from tile data in the file's byte order
    pub fn read_u16_from_tile(
        tile_data: &[u8],
        pixel_index: usize,
        byte_order: ByteOrder,
    ) -> Result<u16> {
        let byte_offset = pixel_index * 2;
        match tile_data.get(byte_offset..byte_offset + 2) {
            Some(bytes) => Ok(byte_order.u16_from([bytes[0], bytes[1]])),
            None => Err(Error::InvalidFormat(format!(
                "sample offset {} exceeds tile data length {}",
                byte_offset,
                tile_data.len()
            ))),
        }
    }
}
