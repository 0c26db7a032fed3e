//! World file (`.tfw`) parsing
//!
//! A world file holds six numbers, one per line, describing the affine
//! transform from pixel to world coordinates:
//!
//! ```text
//! A   pixel size in X
//! D   rotation about the Y axis
//! B   rotation about the X axis
//! E   pixel size in Y (usually negative)
//! C   X of the center of the top-left pixel
//! F   Y of the center of the top-left pixel
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Dimensions;

/// Sidecar extensions tried next to a raster, in order
pub const SIDECAR_EXTENSIONS: [&str; 3] = ["tfw", "tifw", "wld"];

const FIELD_NAMES: [&str; 6] = [
    "pixel size X",
    "rotation Y",
    "rotation X",
    "pixel size Y",
    "origin X",
    "origin Y",
];

/// The six affine coefficients of a world file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFile {
    /// A
    pub pixel_size_x: f64,
    /// D
    pub rotation_y: f64,
    /// B
    pub rotation_x: f64,
    /// E
    pub pixel_size_y: f64,
    /// C
    pub origin_x: f64,
    /// F
    pub origin_y: f64,
}

impl WorldFile {
    /// Reads and parses a world file
    ///
    /// Content that is not valid UTF-8 is a format error on the line where
    /// decoding fails.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|err| {
            let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
            Error::WorldFile {
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                message: "line is not valid UTF-8 text".to_string(),
            }
        })?;
        let world = Self::parse(&text)?;
        debug!(path = %path.display(), ?world, "read world file");
        Ok(world)
    }

    /// Parses world file text
    ///
    /// Blank lines are skipped. Errors carry the 1-based line number of the
    /// offending line, or of the last line when values are missing.
    pub fn parse(text: &str) -> Result<Self> {
        let mut values = [0f64; 6];
        let mut found = 0;
        let mut last_line = 0;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            last_line = line_no;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if found == values.len() {
                debug!(line = line_no, "ignoring trailing world file content");
                break;
            }

            values[found] = trimmed.parse::<f64>().map_err(|_| Error::WorldFile {
                line: line_no,
                message: format!("expected {}, found {:?}", FIELD_NAMES[found], trimmed),
            })?;
            found += 1;
        }

        if found < values.len() {
            return Err(Error::WorldFile {
                line: last_line,
                message: format!(
                    "expected 6 values, found {} (missing {})",
                    found, FIELD_NAMES[found]
                ),
            });
        }

        let [pixel_size_x, rotation_y, rotation_x, pixel_size_y, origin_x, origin_y] = values;
        Ok(Self {
            pixel_size_x,
            rotation_y,
            rotation_x,
            pixel_size_y,
            origin_x,
            origin_y,
        })
    }

    /// Conventional sidecar paths for a raster, in lookup order
    pub fn sidecar_candidates<P: AsRef<Path>>(raster_path: P) -> Vec<PathBuf> {
        let raster_path = raster_path.as_ref();
        SIDECAR_EXTENSIONS
            .iter()
            .map(|ext| raster_path.with_extension(ext))
            .collect()
    }

    /// Returns the first sidecar that exists next to the raster
    pub fn find_sidecar<P: AsRef<Path>>(raster_path: P) -> Option<PathBuf> {
        Self::sidecar_candidates(raster_path)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    /// World extent covered by pixel centers, as (min_x, min_y, max_x, max_y)
    pub fn bounding_box(&self, dims: Dimensions) -> Option<(f64, f64, f64, f64)> {
        let last = dims.last_pixel()?;
        let (last_row, last_col) = (last.row as f64, last.col as f64);

        let corners = [(0.0, 0.0), (0.0, last_col), (last_row, 0.0), (last_row, last_col)];
        let mut bbox = (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (row, col) in corners {
            let x = self.origin_x + col * self.pixel_size_x + row * self.rotation_x;
            let y = self.origin_y + col * self.rotation_y + row * self.pixel_size_y;
            bbox.0 = bbox.0.min(x);
            bbox.1 = bbox.1.min(y);
            bbox.2 = bbox.2.max(x);
            bbox.3 = bbox.3.max(y);
        }
        Some(bbox)
    }
}

impl FromStr for WorldFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for WorldFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "World File:")?;
        writeln!(f, "  Pixel Size: ({}, {})", self.pixel_size_x, self.pixel_size_y)?;
        writeln!(f, "  Rotation: ({}, {})", self.rotation_x, self.rotation_y)?;
        write!(f, "  Origin: ({}, {})", self.origin_x, self.origin_y)
    }
}
