//! Command-line configuration for the importer binary.
//!
//! # Modes
//!
//! - **Batch**: `geotiff-pointcloud dem.tif --start 0,0 --end 99,99 -o cloud.csv`
//! - **Interactive**: without `--start`/`--end`, or with `--interactive`, the
//!   missing values are asked for on the terminal; values given on the
//!   command line answer their prompts
//! - **Info**: `--info` prints the raster layout and world extent, then exits
//!
//! The world file defaults to a sidecar next to the raster (`.tfw`, `.tifw`
//! or `.wld`). Logging honors `RUST_LOG`.

use std::io;
use std::path::PathBuf;

use clap::Parser;

use crate::driver::{ImportOptions, ImportParams, DEFAULT_LAYER_NAME};
use crate::error::{Error, Result};
use crate::formats::WorldFile;
use crate::host::console::parse_pixel;
use crate::host::{Color, OutputFormat};
use crate::types::PixelCoord;

// =============================================================================
// Default Values
// =============================================================================

/// Default Z multiplier (raw sample values).
pub const DEFAULT_Z_SCALE: f64 = 1.0;

/// Default output format when neither `--format` nor the output extension decide.
pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Csv;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Import a 16-bit grayscale GeoTIFF as a point cloud.
///
/// Every pixel of the requested range becomes one point: X and Y from the
/// world file, Z from the pixel value.
#[derive(Parser, Debug, Clone)]
#[command(name = "geotiff-pointcloud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tiled, uncompressed, 16-bit grayscale TIFF to import.
    pub tiff: Option<PathBuf>,

    /// World file for the raster.
    ///
    /// Defaults to a `.tfw`, `.tifw` or `.wld` sidecar next to the TIFF.
    #[arg(short, long)]
    pub world: Option<PathBuf>,

    /// First pixel of the range, as ROW,COL (inclusive).
    #[arg(long, value_parser = parse_pixel, value_name = "ROW,COL")]
    pub start: Option<PixelCoord>,

    /// Last pixel of the range, as ROW,COL (inclusive).
    #[arg(long, value_parser = parse_pixel, value_name = "ROW,COL")]
    pub end: Option<PixelCoord>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Output file; points go to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Name of the created layer.
    #[arg(long, default_value = DEFAULT_LAYER_NAME)]
    pub layer_name: String,

    // =========================================================================
    // Point Mapping
    // =========================================================================
    /// Multiplier applied to pixel values to get Z.
    #[arg(long, default_value_t = DEFAULT_Z_SCALE)]
    pub z_scale: f64,

    /// Pixel value that produces no point.
    #[arg(long)]
    pub nodata: Option<u16>,

    /// Shift points so the center of the range sits at the origin.
    #[arg(long, default_value_t = false)]
    pub recenter: bool,

    // =========================================================================
    // Behavior
    // =========================================================================
    /// Read tiles with buffered I/O instead of a memory map.
    #[arg(long, default_value_t = false)]
    pub no_mmap: bool,

    /// Print the raster layout and world extent, then exit.
    #[arg(long, default_value_t = false)]
    pub info: bool,

    /// Ask for missing inputs on the terminal.
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.z_scale.is_finite() {
            return Err("z_scale must be a finite number".to_string());
        }

        if self.layer_name.trim().is_empty() {
            return Err("layer_name must not be empty".to_string());
        }

        if self.info && self.tiff.is_none() {
            return Err("--info requires a TIFF path".to_string());
        }

        if self.end.is_some() && self.start.is_none() {
            return Err("--end requires --start".to_string());
        }

        if self.start.is_some() != self.end.is_some() && !self.interactive {
            return Err("--start and --end must be given together".to_string());
        }

        if !self.is_interactive() && self.tiff.is_none() {
            return Err("a TIFF path is required unless running interactively".to_string());
        }

        Ok(())
    }

    /// Whether prompts are needed to complete the inputs
    pub fn is_interactive(&self) -> bool {
        self.interactive || self.start.is_none() || self.end.is_none()
    }

    /// Output format from `--format`, the output extension, or the default
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| self.output.as_ref().and_then(OutputFormat::from_path))
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    /// World file from `--world` or a sidecar of the TIFF
    pub fn world_path(&self) -> Option<PathBuf> {
        self.world
            .clone()
            .or_else(|| self.tiff.as_ref().and_then(WorldFile::find_sidecar))
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            layer_name: self.layer_name.clone(),
            color: Color::SANDY_BROWN,
            z_scale: self.z_scale,
            nodata: self.nodata,
            recenter: self.recenter,
            use_mmap: !self.no_mmap,
        }
    }

    /// Builds batch parameters; fails if any input is missing
    pub fn import_params(&self) -> Result<ImportParams> {
        let tiff_path = self
            .tiff
            .clone()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::NotFound, "no TIFF path given")))?;
        let world_path = self.world_path().ok_or_else(|| {
            Error::WorldFile {
                line: 0,
                message: format!("no world file given or found next to {}", tiff_path.display()),
            }
        })?;
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(Error::InvalidRange("--start and --end are required".to_string()));
        };

        Ok(ImportParams {
            tiff_path,
            world_path,
            start,
            end,
            options: self.import_options(),
        })
    }

    /// Paths known before prompting, in prompt order (TIFF, then world file)
    pub fn prefilled_files(&self) -> Vec<PathBuf> {
        let Some(tiff) = self.tiff.clone() else {
            return Vec::new();
        };
        match self.world_path() {
            Some(world) => vec![tiff, world],
            None => vec![tiff],
        }
    }

    /// Pixels known before prompting, in prompt order (start, then end)
    pub fn prefilled_pixels(&self) -> Vec<PixelCoord> {
        self.start.into_iter().chain(self.end).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
