//! Import driver
//!
//! Two entry points share one import core:
//!
//! - [`import_point_cloud`] takes explicit parameters, validated up front
//! - [`run_interactive`] collects the same parameters through a [`Prompter`]
//!
//! Both create one layer in the host and add one point per pixel of the
//! requested range, in row-major order. A failure part way through leaves the
//! points already added in place.

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::formats::tiff::{TiffImage, TiffReader};
use crate::formats::WorldFile;
use crate::host::{Color, LayerId, PointCloudHost, Prompter};
use crate::io::SeekableReader;
use crate::projection::CoordinateMapper;
use crate::types::{PixelCoord, PixelRange};

/// Layer name used when none is given
pub const DEFAULT_LAYER_NAME: &str = "Imported GeoTIFF PointCloud";

/// Extensions offered by the raster prompt
pub const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// Extensions offered by the world file prompt
pub const WORLD_FILE_EXTENSIONS: [&str; 3] = ["tfw", "tifw", "wld"];

/// Runtime options shared by both entry points
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub layer_name: String,
    pub color: Color,
    /// Multiplier applied to every sample to get Z
    pub z_scale: f64,
    /// Sample value that produces no point
    pub nodata: Option<u16>,
    /// Shift points so the center of the range sits at (0, 0)
    pub recenter: bool,
    /// Memory-map the raster for tile reads
    pub use_mmap: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            color: Color::SANDY_BROWN,
            z_scale: 1.0,
            nodata: None,
            recenter: false,
            use_mmap: true,
        }
    }
}

/// Everything needed for a non-interactive import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportParams {
    pub tiff_path: PathBuf,
    pub world_path: PathBuf,
    /// First pixel, inclusive
    pub start: PixelCoord,
    /// Last pixel, inclusive
    pub end: PixelCoord,
    pub options: ImportOptions,
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub layer: LayerId,
    pub points_added: u64,
    pub skipped_nodata: u64,
    pub tiles_read: usize,
}

/// Imports a pixel range into a new host layer
///
/// The range shape is checked before any file is opened; the layout of the
/// raster is validated before the layer is created.
pub fn import_point_cloud<H>(params: &ImportParams, host: &mut H) -> Result<ImportSummary>
where
    H: PointCloudHost + ?Sized,
{
    let range = PixelRange::new(params.start, params.end)?;

    let mut reader = TiffReader::open_with_options(&params.tiff_path, params.options.use_mmap)?;
    let image = reader.read_image()?;
    let world = WorldFile::from_path(&params.world_path)?;

    import_range(&mut reader, &image, &world, &range, &params.options, host)
}

/// Prompts for the raster, the world file and the pixel range, then imports
///
/// Prompts run in a fixed order: raster, world file, start pixel, end pixel.
/// A dismissed prompt fails with a UserCancelled error and nothing is added
/// to the host. Invalid answers abort the run; there is no re-prompt.
pub fn run_interactive<P, H>(prompter: &mut P, host: &mut H, options: &ImportOptions) -> Result<ImportSummary>
where
    P: Prompter + ?Sized,
    H: PointCloudHost + ?Sized,
{
    let tiff_path = prompter
        .open_file("Select GeoTIFF", &TIFF_EXTENSIONS)?
        .ok_or_else(|| Error::Cancelled("GeoTIFF selection".to_string()))?;
    let world_path = prompter
        .open_file("Select world file", &WORLD_FILE_EXTENSIONS)?
        .ok_or_else(|| Error::Cancelled("world file selection".to_string()))?;

    let mut reader = TiffReader::open_with_options(&tiff_path, options.use_mmap)?;
    let image = reader.read_image()?;
    let world = WorldFile::from_path(&world_path)?;

    let last = image
        .dimensions
        .last_pixel()
        .ok_or_else(|| Error::InvalidFormat("image has no pixels".to_string()))?;

    let start = prompter
        .pixel("Start pixel", PixelCoord::new(0, 0), last)?
        .ok_or_else(|| Error::Cancelled("start pixel".to_string()))?;
    let end = prompter
        .pixel("End pixel", last, last)?
        .ok_or_else(|| Error::Cancelled("end pixel".to_string()))?;
    let range = PixelRange::new(start, end)?;

    debug!(tiff = %tiff_path.display(), world = %world_path.display(), %start, %end, "prompts answered");
    import_range(&mut reader, &image, &world, &range, options, host)
}

/// Reports a failed run through the host's notification channel
pub fn notify_failure<H>(host: &mut H, err: &Error)
where
    H: PointCloudHost + ?Sized,
{
    error!(kind = ?err.kind(), "{}", err);
    host.notify(&format!("GeoTIFF import failed: {}", err));
}

fn import_range<R, H>(
    reader: &mut TiffReader<R>,
    image: &TiffImage,
    world: &WorldFile,
    range: &PixelRange,
    options: &ImportOptions,
    host: &mut H,
) -> Result<ImportSummary>
where
    R: SeekableReader,
    H: PointCloudHost + ?Sized,
{
    range.check_within(image.dimensions)?;

    let mut mapper = CoordinateMapper::new(world).with_z_scale(options.z_scale);
    if options.recenter {
        mapper = mapper.recentered_on(range);
        debug!(offset = ?mapper.offset(), "recentering points");
    }

    let layer = host.create_layer(&options.layer_name, options.color)?;
    info!(
        layer = %layer,
        name = %options.layer_name,
        start = %range.start(),
        end = %range.end(),
        pixels = range.pixel_count(),
        "importing pixel range"
    );

    let mut points_added = 0u64;
    let mut skipped_nodata = 0u64;
    reader.read_window(image, range, |sample| {
        if options.nodata == Some(sample.value) {
            skipped_nodata += 1;
            return Ok(());
        }
        host.add_point(layer, mapper.to_point(&sample))?;
        points_added += 1;
        Ok(())
    })?;

    let summary = ImportSummary {
        layer,
        points_added,
        skipped_nodata,
        tiles_read: reader.tiles_read().len(),
    };
    info!(
        points = summary.points_added,
        skipped = summary.skipped_nodata,
        tiles = summary.tiles_read,
        "import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tempfile::NamedTempFile;

    use crate::error::ErrorKind;
    use crate::formats::tiff::testing::{write_temp_bytes, TiffBuilder};
    use crate::host::MemoryDocument;
    use crate::types::PointCloudPoint;

    const WORLD: &str = "1\n0\n0\n-1\n100\n200\n";

    struct Fixture {
        tiff: NamedTempFile,
        world: NamedTempFile,
    }

    impl Fixture {
        fn new(builder: TiffBuilder) -> Self {
            Self {
                tiff: builder.write_temp(),
                world: write_temp_bytes(WORLD.as_bytes(), ".tfw"),
            }
        }

        fn params(&self, start: (u64, u64), end: (u64, u64)) -> ImportParams {
            ImportParams {
                tiff_path: self.tiff.path().to_path_buf(),
                world_path: self.world.path().to_path_buf(),
                start: PixelCoord::new(start.0, start.1),
                end: PixelCoord::new(end.0, end.1),
                options: ImportOptions::default(),
            }
        }
    }

    /// Replays canned answers
    #[derive(Default)]
    struct ScriptedPrompter {
        files: VecDeque<Option<PathBuf>>,
        pixels: VecDeque<Option<PixelCoord>>,
        asked: Vec<String>,
    }

    impl Prompter for ScriptedPrompter {
        fn open_file(&mut self, title: &str, _extensions: &[&str]) -> Result<Option<PathBuf>> {
            self.asked.push(title.to_string());
            Ok(self.files.pop_front().flatten())
        }

        fn pixel(&mut self, title: &str, default: PixelCoord, _max: PixelCoord) -> Result<Option<PixelCoord>> {
            self.asked.push(title.to_string());
            Ok(self.pixels.pop_front().unwrap_or(Some(default)))
        }
    }

    #[test]
    fn test_end_to_end_single_tile() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut doc = MemoryDocument::new();

        let summary = import_point_cloud(&fixture.params((0, 0), (3, 3)), &mut doc).unwrap();
        assert_eq!(summary.points_added, 16);
        assert_eq!(summary.tiles_read, 1);

        let layer = doc.layer(summary.layer).unwrap();
        assert_eq!(layer.name, DEFAULT_LAYER_NAME);
        assert_eq!(layer.color, Color::SANDY_BROWN);
        assert_eq!(layer.points.len(), 16);
        for (index, point) in layer.points.iter().enumerate() {
            let (row, col) = ((index / 4) as f64, (index % 4) as f64);
            assert_eq!(*point, PointCloudPoint::new(100.0 + col, 200.0 - row, index as f64));
        }
    }

    #[test]
    fn test_sub_range_reads_intersecting_tiles_only() {
        let fixture = Fixture::new(TiffBuilder::new(8, 8, 4, 4));
        let mut doc = MemoryDocument::new();

        let summary = import_point_cloud(&fixture.params((1, 5), (2, 6)), &mut doc).unwrap();
        assert_eq!(summary.points_added, 4);
        assert_eq!(summary.tiles_read, 1);
        assert_eq!(
            doc.layers()[0].points[0],
            PointCloudPoint::new(105.0, 199.0, 13.0)
        );
    }

    #[test]
    fn test_start_after_end_is_range_error_without_opening_files() {
        let params = ImportParams {
            tiff_path: PathBuf::from("/nonexistent/dem.tif"),
            world_path: PathBuf::from("/nonexistent/dem.tfw"),
            start: PixelCoord::new(3, 0),
            end: PixelCoord::new(1, 2),
            options: ImportOptions::default(),
        };
        let mut doc = MemoryDocument::new();

        let err = import_point_cloud(&params, &mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_out_of_bounds_creates_no_layer() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut doc = MemoryDocument::new();

        let err = import_point_cloud(&fixture.params((0, 0), (4, 3)), &mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_compressed_raster_is_unsupported() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4).compression(5));
        let mut doc = MemoryDocument::new();

        let err = import_point_cloud(&fixture.params((0, 0), (3, 3)), &mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_bad_world_file() {
        let mut fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        fixture.world = write_temp_bytes(b"1\n0\n0\n", ".tfw");
        let mut doc = MemoryDocument::new();

        let err = import_point_cloud(&fixture.params((0, 0), (3, 3)), &mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_nodata_and_z_scale() {
        let samples = vec![32767, 10, 20, 32767];
        let fixture = Fixture::new(TiffBuilder::new(2, 2, 2, 2).samples(samples));
        let mut params = fixture.params((0, 0), (1, 1));
        params.options.nodata = Some(32767);
        params.options.z_scale = 0.5;
        let mut doc = MemoryDocument::new();

        let summary = import_point_cloud(&params, &mut doc).unwrap();
        assert_eq!(summary.points_added, 2);
        assert_eq!(summary.skipped_nodata, 2);
        let zs: Vec<f64> = doc.layers()[0].points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![5.0, 10.0]);
    }

    #[test]
    fn test_recenter() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut params = fixture.params((0, 0), (2, 2));
        params.options.recenter = true;
        let mut doc = MemoryDocument::new();

        import_point_cloud(&params, &mut doc).unwrap();
        let points = &doc.layers()[0].points;
        assert_eq!(points[4], PointCloudPoint::new(0.0, 0.0, 5.0));
        assert_eq!(points[0], PointCloudPoint::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn test_host_failure_keeps_partial_layer() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut doc = MemoryDocument::with_point_limit(5);

        let err = import_point_cloud(&fixture.params((0, 0), (3, 3)), &mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Host);
        assert_eq!(doc.layers().len(), 1);
        assert_eq!(doc.point_count(), 5);
    }

    #[test]
    fn test_interactive_prompt_order_and_defaults() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4).big_endian());
        let mut prompter = ScriptedPrompter {
            files: VecDeque::from([
                Some(fixture.tiff.path().to_path_buf()),
                Some(fixture.world.path().to_path_buf()),
            ]),
            ..Default::default()
        };
        let mut doc = MemoryDocument::new();

        let summary = run_interactive(&mut prompter, &mut doc, &ImportOptions::default()).unwrap();
        assert_eq!(summary.points_added, 16);
        assert_eq!(
            prompter.asked,
            vec!["Select GeoTIFF", "Select world file", "Start pixel", "End pixel"]
        );
    }

    #[test]
    fn test_interactive_cancelled_creates_no_layer() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut doc = MemoryDocument::new();

        let mut prompter = ScriptedPrompter {
            files: VecDeque::from([None]),
            ..Default::default()
        };
        let err = run_interactive(&mut prompter, &mut doc, &ImportOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserCancelled);
        assert_eq!(prompter.asked.len(), 1);

        let mut prompter = ScriptedPrompter {
            files: VecDeque::from([
                Some(fixture.tiff.path().to_path_buf()),
                Some(fixture.world.path().to_path_buf()),
            ]),
            pixels: VecDeque::from([Some(PixelCoord::new(1, 1)), None]),
            ..Default::default()
        };
        let err = run_interactive(&mut prompter, &mut doc, &ImportOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserCancelled);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_interactive_start_after_end() {
        let fixture = Fixture::new(TiffBuilder::new(4, 4, 4, 4));
        let mut prompter = ScriptedPrompter {
            files: VecDeque::from([
                Some(fixture.tiff.path().to_path_buf()),
                Some(fixture.world.path().to_path_buf()),
            ]),
            pixels: VecDeque::from([Some(PixelCoord::new(3, 3)), Some(PixelCoord::new(0, 0))]),
            ..Default::default()
        };
        let mut doc = MemoryDocument::new();

        let err = run_interactive(&mut prompter, &mut doc, &ImportOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_notify_failure() {
        let mut doc = MemoryDocument::new();
        notify_failure(&mut doc, &Error::Cancelled("GeoTIFF selection".to_string()));
        assert_eq!(doc.messages().len(), 1);
        assert!(doc.messages()[0].contains("GeoTIFF selection"));
    }
}
