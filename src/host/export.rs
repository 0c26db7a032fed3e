//! Host document that writes points to a file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::host::{Color, LayerId, PointCloudHost};
use crate::types::PointCloudPoint;

/// File format written by [`ExportDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `layer,x,y,z` row per point
    Csv,
    /// One document with every layer and its points
    Json,
}

impl OutputFormat {
    /// Guesses the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "xyz" | "txt" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    layer: &'a str,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Serialize)]
struct ExportLayer {
    name: String,
    color: Color,
    points: Vec<PointCloudPoint>,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    layers: &'a [ExportLayer],
    messages: &'a [String],
}

enum Sink<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

/// Writes imported points as CSV (streamed) or JSON (on [`ExportDocument::finish`])
///
/// Notifications are always logged. Only the JSON document keeps them; CSV
/// output has no place for them and drops them after logging.
pub struct ExportDocument<W: Write> {
    sink: Sink<W>,
    layers: Vec<ExportLayer>,
    messages: Vec<String>,
    points_written: u64,
}

impl ExportDocument<BufWriter<File>> {
    /// Creates the output file
    pub fn create<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(path = %path.display(), ?format, "created export file");
        Self::new(BufWriter::new(file), format)
    }
}

impl<W: Write> ExportDocument<W> {
    pub fn new(writer: W, format: OutputFormat) -> Result<Self> {
        let sink = match format {
            OutputFormat::Csv => {
                let mut csv_writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(writer);
                csv_writer.write_record(["layer", "x", "y", "z"])?;
                Sink::Csv(csv_writer)
            }
            OutputFormat::Json => Sink::Json(writer),
        };

        Ok(Self {
            sink,
            layers: Vec::new(),
            messages: Vec::new(),
            points_written: 0,
        })
    }

    pub fn points_written(&self) -> u64 {
        self.points_written
    }

    /// Notifications kept for the JSON document; always empty for CSV
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Flushes all output and returns the underlying writer
    pub fn finish(self) -> Result<W> {
        let mut writer = match self.sink {
            Sink::Csv(csv_writer) => csv_writer
                .into_inner()
                .map_err(|err| Error::Io(err.into_error()))?,
            Sink::Json(mut writer) => {
                let document = JsonDocument {
                    layers: &self.layers,
                    messages: &self.messages,
                };
                serde_json::to_writer_pretty(&mut writer, &document)?;
                writer.write_all(b"\n")?;
                writer
            }
        };
        writer.flush()?;

        info!(points = self.points_written, layers = self.layers.len(), "export finished");
        Ok(writer)
    }
}

impl<W: Write> PointCloudHost for ExportDocument<W> {
    fn create_layer(&mut self, name: &str, color: Color) -> Result<LayerId> {
        let id = LayerId(self.layers.len());
        self.layers.push(ExportLayer {
            name: name.to_string(),
            color,
            points: Vec::new(),
        });
        Ok(id)
    }

    fn add_point(&mut self, layer: LayerId, point: PointCloudPoint) -> Result<()> {
        let target = self
            .layers
            .get_mut(layer.0)
            .ok_or_else(|| Error::Host(format!("unknown layer {}", layer)))?;

        match &mut self.sink {
            Sink::Csv(csv_writer) => csv_writer.serialize(CsvRow {
                layer: &target.name,
                x: point.x,
                y: point.y,
                z: point.z,
            })?,
            Sink::Json(_) => target.points.push(point),
        }
        self.points_written += 1;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        info!(note = message, "host notification");
        if let Sink::Json(_) = self.sink {
            self.messages.push(message.to_string());
        }
    }
}
