use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::project::{Layer, LayerId};
use crate::utils::color::Color;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("layer record: {0}")]
    Json(#[from] serde_json::Error),
}

/// One stored pixel of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelEntry {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

/// Serialized form of a layer: its flags and a flat list of pixel entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub opacity: u8,
    pub locked: bool,
    pub pixels: Vec<PixelEntry>,
}

impl LayerRecord {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Layer {
    /// Entries are sorted row-major so output is stable across runs.
    pub fn to_record(&self) -> LayerRecord {
        let mut pixels: Vec<PixelEntry> = self
            .pixels()
            .map(|((x, y), color)| PixelEntry { x, y, color })
            .collect();
        pixels.sort_by_key(|p| (p.y, p.x));
        LayerRecord {
            id: self.id,
            name: self.name.clone(),
            visible: self.visible,
            opacity: self.opacity,
            locked: self.locked,
            pixels,
        }
    }

    /// Rebuild a layer, inserting each entry as an ordinary map write.
    pub fn from_record(record: &LayerRecord) -> Self {
        let mut layer = Layer::new(record.id, record.name.clone());
        layer.visible = record.visible;
        layer.opacity = record.opacity;
        layer.locked = record.locked;
        for entry in &record.pixels {
            layer.write(entry.x, entry.y, Some(entry.color));
        }
        layer
    }
}
