//! In-memory host document

use tracing::info;

use crate::error::{Error, Result};
use crate::host::{Color, LayerId, PointCloudHost};
use crate::types::PointCloudPoint;

/// A named, colored set of points
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub color: Color,
    pub points: Vec<PointCloudPoint>,
}

/// Host document that keeps layers and notifications in memory
#[derive(Debug, Default)]
pub struct MemoryDocument {
    layers: Vec<Layer>,
    messages: Vec<String>,
    point_limit: Option<usize>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects points once the document holds `limit` points in total
    pub fn with_point_limit(limit: usize) -> Self {
        Self {
            point_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Messages passed to [`PointCloudHost::notify`], oldest first
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn point_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.points.len()).sum()
    }
}

impl PointCloudHost for MemoryDocument {
    fn create_layer(&mut self, name: &str, color: Color) -> Result<LayerId> {
        let id = LayerId(self.layers.len());
        self.layers.push(Layer {
            name: name.to_string(),
            color,
            points: Vec::new(),
        });
        Ok(id)
    }

    fn add_point(&mut self, layer: LayerId, point: PointCloudPoint) -> Result<()> {
        if let Some(limit) = self.point_limit {
            if self.point_count() >= limit {
                return Err(Error::Host(format!("document is full ({} points)", limit)));
            }
        }

        let target = self
            .layers
            .get_mut(layer.0)
            .ok_or_else(|| Error::Host(format!("unknown layer {}", layer)))?;
        target.points.push(point);
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        info!(note = message, "host notification");
        self.messages.push(message.to_string());
    }
}
