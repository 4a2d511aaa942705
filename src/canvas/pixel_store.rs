//! PixelStore: the only path through which layer pixel maps change.
//!
//! Every successful write produces a [`PixelDelta`]; deltas are what the chunk
//! cache patches from and what history records.

use crate::canvas::project::{LayerId, Project};
use crate::utils::color::Color;

/// A single committed pixel change on a layer of the active frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelDelta {
    pub layer: LayerId,
    pub x: i32,
    pub y: i32,
    pub old: Option<Color>,
    pub new: Option<Color>,
}

impl PixelDelta {
    /// The delta that undoes this one.
    pub fn inverse(&self) -> PixelDelta {
        PixelDelta {
            old: self.new,
            new: self.old,
            ..*self
        }
    }
}

/// A requested write; `color: None` erases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelWrite {
    pub layer: LayerId,
    pub x: i32,
    pub y: i32,
    pub color: Option<Color>,
}

impl PixelWrite {
    pub fn paint(layer: LayerId, x: i32, y: i32, color: Color) -> Self {
        Self {
            layer,
            x,
            y,
            color: Some(color),
        }
    }

    pub fn erase(layer: LayerId, x: i32, y: i32) -> Self {
        Self {
            layer,
            x,
            y,
            color: None,
        }
    }
}

impl Project {
    pub fn get_pixel(&self, layer: LayerId, x: i32, y: i32) -> Option<Color> {
        self.layer(layer)?.pixel(x, y)
    }

    /// Write (or erase with `None`) a pixel on an unlocked, visible layer.
    ///
    /// Returns `None` when the layer is missing, locked or hidden, or the
    /// pixel already holds `color`.
    pub fn set_pixel(
        &mut self,
        layer: LayerId,
        x: i32,
        y: i32,
        color: Option<Color>,
    ) -> Option<PixelDelta> {
        let target = self.layer_mut(layer)?;
        if !target.is_editable() {
            return None;
        }
        let old = target.pixel(x, y);
        if old == color {
            return None;
        }
        target.write(x, y, color);
        self.modified = true;
        Some(PixelDelta {
            layer,
            x,
            y,
            old,
            new: color,
        })
    }

    /// Apply writes in caller order, returning the deltas of those that took effect.
    pub fn set_pixel_batch<I>(&mut self, writes: I) -> Vec<PixelDelta>
    where
        I: IntoIterator<Item = PixelWrite>,
    {
        writes
            .into_iter()
            .filter_map(|w| self.set_pixel(w.layer, w.x, w.y, w.color))
            .collect()
    }

    /// Write regardless of lock/visibility. Used when replaying history.
    pub fn restore_pixel(
        &mut self,
        layer: LayerId,
        x: i32,
        y: i32,
        color: Option<Color>,
    ) -> Option<PixelDelta> {
        let target = self.layer_mut(layer)?;
        let old = target.write(x, y, color);
        if old == color {
            return None;
        }
        self.modified = true;
        Some(PixelDelta {
            layer,
            x,
            y,
            old,
            new: color,
        })
    }

    /// Whether `layer` exists in the active frame and accepts writes.
    pub fn is_layer_editable(&self, layer: LayerId) -> bool {
        self.layer(layer).is_some_and(|l| l.is_editable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn set_then_erase_leaves_no_key() {
        let mut project = Project::new("t");
        let layer = project.active_layer;
        let delta = project.set_pixel(layer, 5, 5, Some(RED)).unwrap();
        assert_eq!(delta.old, None);
        assert_eq!(delta.new, Some(RED));
        assert!(project.modified);

        project.set_pixel(layer, 5, 5, None).unwrap();
        assert_eq!(project.get_pixel(layer, 5, 5), None);
        assert!(project.layer(layer).unwrap().is_empty());
    }

    #[test]
    fn same_color_is_a_no_op() {
        let mut project = Project::new("t");
        let layer = project.active_layer;
        project.set_pixel(layer, 0, 0, Some(RED));
        assert!(project.set_pixel(layer, 0, 0, Some(RED)).is_none());
        assert!(project.set_pixel(layer, 1, 1, None).is_none());
    }

    #[test]
    fn locked_hidden_and_missing_layers_reject_writes() {
        let mut project = Project::new("t");
        let layer = project.active_layer;
        project.set_layer_locked(layer, true);
        assert!(project.set_pixel(layer, 0, 0, Some(RED)).is_none());
        project.set_layer_locked(layer, false);
        project.set_layer_visible(layer, false);
        assert!(project.set_pixel(layer, 0, 0, Some(RED)).is_none());
        assert!(project.set_pixel(LayerId(99), 0, 0, Some(RED)).is_none());
        assert_eq!(project.get_pixel(LayerId(99), 0, 0), None);
    }

    #[test]
    fn batch_keeps_order_and_skips_no_ops() {
        let mut project = Project::new("t");
        let layer = project.active_layer;
        let deltas = project.set_pixel_batch([
            PixelWrite::paint(layer, 0, 0, RED),
            PixelWrite::paint(layer, 0, 0, RED),
            PixelWrite::paint(layer, 0, 0, BLUE),
            PixelWrite::erase(layer, 9, 9),
        ]);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[1].old, Some(RED));
        assert_eq!(deltas[1].new, Some(BLUE));
    }

    #[test]
    fn restore_ignores_lock() {
        let mut project = Project::new("t");
        let layer = project.active_layer;
        project.set_layer_locked(layer, true);
        let delta = project.restore_pixel(layer, -4, 2, Some(BLUE)).unwrap();
        assert_eq!(delta.inverse().new, None);
        assert_eq!(project.get_pixel(layer, -4, 2), Some(BLUE));
    }
}
