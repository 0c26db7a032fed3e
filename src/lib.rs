//! geotiff-pointcloud - Import GeoTIFF elevation rasters as point clouds
//!
//! Reads a tiled, uncompressed, 16-bit grayscale GeoTIFF together with its
//! world file and turns a pixel range into points: X and Y from the world
//! file's affine transform, Z from the pixel value. Points go to a host
//! document reached through the [`PointCloudHost`] trait.
//!
//! # Examples
//!
//! ## Importing a Range
//!
//! ```no_run
//! use geotiff_pointcloud::{import_point_cloud, ImportOptions, ImportParams, MemoryDocument, PixelCoord};
//!
//! let params = ImportParams {
//!     tiff_path: "dem.tif".into(),
//!     world_path: "dem.tfw".into(),
//!     start: PixelCoord::new(0, 0),
//!     end: PixelCoord::new(99, 99),
//!     options: ImportOptions::default(),
//! };
//!
//! let mut doc = MemoryDocument::new();
//! let summary = import_point_cloud(&params, &mut doc)?;
//! println!("{} points in layer {}", summary.points_added, summary.layer);
//! # Ok::<(), geotiff_pointcloud::Error>(())
//! ```
//!
//! ## Reading Samples Directly
//!
//! ```no_run
//! use geotiff_pointcloud::{PixelCoord, PixelRange, TiffReader};
//!
//! let mut reader = TiffReader::open("dem.tif")?;
//! let image = reader.read_image()?;
//! println!("{}", image);
//!
//! let range = PixelRange::new(PixelCoord::new(0, 0), PixelCoord::new(9, 9))?;
//! for sample in reader.read_samples(&image, &range)? {
//!     println!("({}, {}) = {}", sample.row, sample.col, sample.value);
//! }
//! # Ok::<(), geotiff_pointcloud::Error>(())
//! ```

pub mod io;
pub mod error;
pub mod types;
pub mod formats;
pub mod projection;
pub mod host;
pub mod driver;
pub mod config;

pub use error::{Error, ErrorKind, Result};
pub use types::{Dimensions, PixelCoord, PixelRange, PixelSample, PointCloudPoint};
pub use formats::tiff::{
    TiffImage, TiffReader, IFD, IFDEntry,
    tags, TIFF_MAGIC, BIGTIFF_MAGIC
};
pub use formats::WorldFile;
pub use io::{ByteOrder, SeekableReader};
pub use projection::{AffineTransform, CoordinateMapper};
pub use host::{
    Color, ConsolePrompter, ExportDocument, LayerId, MemoryDocument, OutputFormat,
    PointCloudHost, PrefilledPrompter, Prompter,
};
pub use driver::{
    import_point_cloud, notify_failure, run_interactive, ImportOptions, ImportParams,
    ImportSummary,
};
