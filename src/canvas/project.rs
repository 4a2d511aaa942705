use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::color::Color;
use crate::utils::geometry::{Coord, IRect};

/// Stable layer identity, shared by the same track across every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone)]
/// Single pixel layer: display flags plus a sparse coordinate -> color map.
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub opacity: u8, // 0..255
    pub locked: bool,
    pixels: HashMap<Coord, Color>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            opacity: 255,
            locked: false,
            pixels: HashMap::new(),
        }
    }

    /// An empty copy with the same identity and flags.
    pub fn empty_like(&self) -> Self {
        Self {
            pixels: HashMap::new(),
            name: self.name.clone(),
            ..*self
        }
    }

    /// Whether PixelStore writes may touch this layer.
    pub fn is_editable(&self) -> bool {
        self.visible && !self.locked
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.pixels.get(&(x, y)).copied()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        self.pixels.iter().map(|(&c, &color)| (c, color))
    }

    /// Smallest rectangle containing every stored pixel.
    pub fn content_bounds(&self) -> Option<IRect> {
        IRect::bounding(self.pixels.keys().copied())
    }

    /// Raw sparse-map write. `None` removes the key; returns the previous color.
    pub(crate) fn write(&mut self, x: i32, y: i32, color: Option<Color>) -> Option<Color> {
        match color {
            Some(c) => self.pixels.insert((x, y), c),
            None => self.pixels.remove(&(x, y)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    Viewport,
    EffectZone,
    Mask,
}

/// Region descriptor attached to a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub rect: IRect,
    pub kind: BorderKind,
    /// Fills seeded inside this rect wrap at its edges.
    pub wrap: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub layers: Vec<Layer>,
    pub borders: Vec<Border>,
}

impl Frame {
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// First wrap-flagged border containing `(x, y)`.
    pub fn tiled_region_at(&self, x: i32, y: i32) -> Option<IRect> {
        self.borders
            .iter()
            .find(|b| b.wrap && !b.rect.is_empty() && b.rect.contains(x, y))
            .map(|b| b.rect)
    }

    /// Union of the content bounds of every visible layer.
    pub fn visible_content_bounds(&self) -> Option<IRect> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .filter_map(Layer::content_bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Document root: frames of identity-aligned layers plus palette and selection state.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub frames: Vec<Frame>,
    pub palette: Vec<Color>,
    pub active_frame: usize,
    pub active_layer: LayerId,
    pub modified: bool,
    next_layer_id: u64,
}

impl Project {
    /// A project with one frame holding a single empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        let first = LayerId(1);
        let frame = Frame {
            layers: vec![Layer::new(first, "Layer 1")],
            borders: Vec::new(),
        };
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            frames: vec![frame],
            palette: vec![Color::BLACK, Color::WHITE],
            active_frame: 0,
            active_layer: first,
            modified: false,
            next_layer_id: 2,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frames[self.active_frame]
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.active_frame]
    }

    /// Layer `id` in the active frame.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.frame().layer(id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.frame_mut().layer_mut(id)
    }

    /// Append a new layer on top, in every frame, and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        let name = name.into();
        for frame in &mut self.frames {
            frame.layers.push(Layer::new(id, name.clone()));
        }
        self.active_layer = id;
        self.modified = true;
        log::info!("added layer {:?} ({name})", id);
        id
    }

    /// Remove a layer track from every frame, returning the removed layers.
    ///
    /// The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Vec<Layer>> {
        if self.frame().layers.len() <= 1 || self.frame().layer(id).is_none() {
            return None;
        }
        let mut removed = Vec::with_capacity(self.frames.len());
        for frame in &mut self.frames {
            if let Some(idx) = frame.layer_index(id) {
                removed.push(frame.layers.remove(idx));
            }
        }
        if self.active_layer == id {
            if let Some(top) = self.frame().layers.last() {
                self.active_layer = top.id;
            }
        }
        self.modified = true;
        log::info!("removed layer {:?}", id);
        Some(removed)
    }

    /// Append a frame whose layers mirror the current track list, empty.
    pub fn add_frame(&mut self) -> usize {
        let frame = Frame {
            layers: self.frame().layers.iter().map(Layer::empty_like).collect(),
            borders: self.frame().borders.clone(),
        };
        self.frames.push(frame);
        self.modified = true;
        self.frames.len() - 1
    }

    /// Switch the active frame. Returns false for an out-of-range index.
    pub fn set_active_frame(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.active_frame = index;
        true
    }

    /// Apply `f` to layer `id` in every frame, so display flags stay aligned.
    pub(crate) fn update_track(&mut self, id: LayerId, f: impl Fn(&mut Layer)) -> bool {
        let mut found = false;
        for frame in &mut self.frames {
            if let Some(layer) = frame.layer_mut(id) {
                f(layer);
                found = true;
            }
        }
        if found {
            self.modified = true;
        }
        found
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.update_track(id, |l| l.visible = visible)
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> bool {
        self.update_track(id, |l| l.locked = locked)
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: u8) -> bool {
        self.update_track(id, |l| l.opacity = opacity)
    }
}
