//! Core data types for geotiff-pointcloud

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Represents image or tile dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u64,
    /// Height in pixels
    pub height: u64,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> u64 {
        self.width * self.height
    }

    /// Returns the bottom-right pixel, or `None` for an empty image
    pub fn last_pixel(&self) -> Option<PixelCoord> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(PixelCoord::new(self.height - 1, self.width - 1))
    }
}

/// A pixel position, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub row: u64,
    pub col: u64,
}

impl PixelCoord {
    pub fn new(row: u64, col: u64) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for PixelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An inclusive rectangular pixel range
///
/// Construction guarantees `start.row <= end.row` and `start.col <= end.col`.
/// Bounds against a particular image are checked separately with
/// [`PixelRange::check_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    start: PixelCoord,
    end: PixelCoord,
}

impl PixelRange {
    /// Creates a range, failing if start lies after end on either axis
    pub fn new(start: PixelCoord, end: PixelCoord) -> Result<Self> {
        if start.row > end.row || start.col > end.col {
            return Err(Error::InvalidRange(format!(
                "start pixel {} lies after end pixel {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> PixelCoord {
        self.start
    }

    pub fn end(&self) -> PixelCoord {
        self.end
    }

    /// Number of rows covered
    pub fn rows(&self) -> u64 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns covered
    pub fn cols(&self) -> u64 {
        self.end.col - self.start.col + 1
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> u64 {
        self.rows() * self.cols()
    }

    /// Center of the range in fractional pixel space, as (row, col)
    pub fn center(&self) -> (f64, f64) {
        (
            (self.start.row + self.end.row) as f64 / 2.0,
            (self.start.col + self.end.col) as f64 / 2.0,
        )
    }

    /// Fails with [`Error::OutOfBounds`] unless the whole range lies inside the image
    pub fn check_within(&self, dims: Dimensions) -> Result<()> {
        if self.end.row >= dims.height || self.end.col >= dims.width {
            return Err(Error::OutOfBounds(format!(
                "pixel range {} - {} outside image bounds ({} x {})",
                self.start, self.end, dims.width, dims.height
            )));
        }
        Ok(())
    }
}

/// A decoded 16-bit sample at a pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub row: u64,
    pub col: u64,
    pub value: u16,
}

/// A point handed to the host document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointCloudPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PointCloudPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
