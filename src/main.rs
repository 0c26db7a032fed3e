//! geotiff-pointcloud - Import a GeoTIFF pixel range as a point cloud.
//!
//! Points are written as CSV or JSON to a file or stdout; logs and prompts
//! go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geotiff_pointcloud::{
    config::Cli, import_point_cloud, notify_failure, run_interactive, ConsolePrompter,
    ExportDocument, PrefilledPrompter, TiffReader, WorldFile,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    if cli.info {
        return run_info(&cli);
    }

    let format = cli.output_format();
    match &cli.output {
        Some(path) => match ExportDocument::create(path, format) {
            Ok(doc) => run_import(&cli, doc),
            Err(e) => {
                error!("Failed to create {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        None => match ExportDocument::new(io::stdout().lock(), format) {
            Ok(doc) => run_import(&cli, doc),
            Err(e) => {
                error!("Failed to write to stdout: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

// =============================================================================
// Import
// =============================================================================

fn run_import<W: Write>(cli: &Cli, mut doc: ExportDocument<W>) -> ExitCode {
    let options = cli.import_options();

    let result = if cli.is_interactive() {
        let mut prompter = PrefilledPrompter::new(ConsolePrompter::stdio(), cli.prefilled_files())
            .with_pixels(cli.prefilled_pixels());
        run_interactive(&mut prompter, &mut doc, &options)
    } else {
        cli.import_params()
            .and_then(|params| import_point_cloud(&params, &mut doc))
    };

    match result {
        Ok(summary) => {
            if let Err(e) = doc.finish() {
                error!("Failed to write points: {}", e);
                return ExitCode::FAILURE;
            }
            info!(
                "Imported {} points into layer \"{}\" ({} no-data pixels skipped, {} tiles read)",
                summary.points_added, options.layer_name, summary.skipped_nodata, summary.tiles_read
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            notify_failure(&mut doc, &e);
            if let Err(finish_err) = doc.finish() {
                warn!("Failed to flush partial output: {}", finish_err);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Info
// =============================================================================

fn run_info(cli: &Cli) -> ExitCode {
    let Some(tiff) = cli.tiff.as_ref() else {
        error!("--info requires a TIFF path");
        return ExitCode::FAILURE;
    };

    let image = match TiffReader::open_with_options(tiff, !cli.no_mmap)
        .and_then(|mut reader| reader.read_image())
    {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to read {}: {}", tiff.display(), e);
            return ExitCode::FAILURE;
        }
    };
    println!("{}", image);

    let Some(world_path) = cli.world_path() else {
        println!("World File: not found");
        return ExitCode::SUCCESS;
    };

    match WorldFile::from_path(&world_path) {
        Ok(world) => {
            println!("{}", world);
            if let Some((min_x, min_y, max_x, max_y)) = world.bounding_box(image.dimensions) {
                println!("  Bounding Box:");
                println!("    Min: ({}, {})", min_x, min_y);
                println!("    Max: ({}, {})", max_x, max_y);
                println!("    Extent: {} x {}", max_x - min_x, max_y - min_y);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to read {}: {}", world_path.display(), e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "geotiff_pointcloud=debug"
    } else {
        "geotiff_pointcloud=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
