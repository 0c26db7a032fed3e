//! Host document integration
//!
//! The importer never talks to a concrete application. It receives a
//! [`PointCloudHost`] that owns layers and points, and, for the interactive
//! flow, a [`Prompter`] that asks the user for files and pixels.
//!
//! Adapters shipped with the crate:
//! - [`MemoryDocument`]: keeps everything in memory
//! - [`ExportDocument`]: writes points to CSV or JSON
//! - [`ConsolePrompter`]: line-based prompts over any reader/writer pair
//! - [`PrefilledPrompter`]: answers file prompts from known paths

pub mod console;
pub mod export;
pub mod memory;
pub mod prefilled;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::types::{PixelCoord, PointCloudPoint};

pub use console::ConsolePrompter;
pub use export::{ExportDocument, OutputFormat};
pub use memory::{Layer, MemoryDocument};
pub use prefilled::PrefilledPrompter;

/// Opaque handle to a layer created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayerId(pub usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGB layer color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const SANDY_BROWN: Color = Color::rgb(244, 164, 96);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::SANDY_BROWN
    }
}

/// Document that receives the imported points
pub trait PointCloudHost {
    /// Creates a new layer and returns its handle
    fn create_layer(&mut self, name: &str, color: Color) -> Result<LayerId>;

    /// Adds one point to a layer; ownership of the point moves to the host
    fn add_point(&mut self, layer: LayerId, point: PointCloudPoint) -> Result<()>;

    /// Shows a message to the user
    fn notify(&mut self, message: &str);
}

/// Source of interactive answers
///
/// `Ok(None)` means the user dismissed the prompt.
pub trait Prompter {
    /// Asks for a file path, hinting at the accepted extensions
    fn open_file(&mut self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>>;

    /// Asks for a pixel position no larger than `max`, offering `default`
    fn pixel(&mut self, title: &str, default: PixelCoord, max: PixelCoord) -> Result<Option<PixelCoord>>;
}

impl<H: PointCloudHost + ?Sized> PointCloudHost for &mut H {
    fn create_layer(&mut self, name: &str, color: Color) -> Result<LayerId> {
        (**self).create_layer(name, color)
    }

    fn add_point(&mut self, layer: LayerId, point: PointCloudPoint) -> Result<()> {
        (**self).add_point(layer, point)
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn open_file(&mut self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>> {
        (**self).open_file(title, extensions)
    }

    fn pixel(&mut self, title: &str, default: PixelCoord, max: PixelCoord) -> Result<Option<PixelCoord>> {
        (**self).pixel(title, default, max)
    }
}
