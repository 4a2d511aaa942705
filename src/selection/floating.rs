use std::collections::HashMap;

use eframe::egui::ColorImage;

use crate::canvas::chunk_cache::alpha_over;
use crate::canvas::pixel_store::{PixelDelta, PixelWrite};
use crate::canvas::project::{LayerId, Project};
use crate::utils::color::Color;
use crate::utils::geometry::{Coord, IRect};

/// A buffer pixel at `(dx, dy)` relative to the buffer origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingPixel {
    pub dx: i32,
    pub dy: i32,
    pub color: Color,
}

/// Pixels lifted out of (or pasted above) a layer, waiting to be anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingBuffer {
    pub(super) pixels: Vec<FloatingPixel>,
    /// World coordinate of the buffer origin.
    pub(super) anchor: Coord,
    pub(super) width: i32,
    pub(super) height: i32,
    pub(super) source: Option<LayerId>,
}

/// Result of a lift: the new buffer and the erasures made on the source layer.
#[derive(Debug, Clone)]
pub struct Lifted {
    pub buffer: FloatingBuffer,
    pub deltas: Vec<PixelDelta>,
}

/// What an anchor stamped over, one record per buffer pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampRecord {
    pub x: i32,
    pub y: i32,
    pub previous: Option<Color>,
    pub stamped: Color,
}

#[derive(Debug, Clone)]
pub struct Anchored {
    pub deltas: Vec<PixelDelta>,
    pub overwritten: Vec<StampRecord>,
}

impl FloatingBuffer {
    /// Move the colored pixels among `cells` from `layer` into a new buffer.
    ///
    /// The buffer origin is the top-left corner of `cells`. Returns `None`
    /// when the layer rejects writes or none of the cells hold a pixel.
    pub fn lift(project: &mut Project, layer: LayerId, cells: &[Coord]) -> Option<Lifted> {
        if !project.is_layer_editable(layer) {
            return None;
        }
        let bounds = IRect::bounding(cells.iter().copied())?;
        let captured: Vec<(Coord, Color)> = cells
            .iter()
            .filter_map(|&(x, y)| project.get_pixel(layer, x, y).map(|c| ((x, y), c)))
            .collect();
        if captured.is_empty() {
            return None;
        }

        let pixels = captured
            .iter()
            .map(|&((x, y), color)| FloatingPixel {
                dx: x - bounds.x,
                dy: y - bounds.y,
                color,
            })
            .collect();
        let deltas = project.set_pixel_batch(
            captured
                .iter()
                .map(|&((x, y), _)| PixelWrite::erase(layer, x, y)),
        );
        log::debug!("lifted {} pixels from layer {:?}", deltas.len(), layer);

        Some(Lifted {
            buffer: Self {
                pixels,
                anchor: (bounds.x, bounds.y),
                width: bounds.w,
                height: bounds.h,
                source: Some(layer),
            },
            deltas,
        })
    }

    /// Build a buffer from arbitrary pixels, normalized to a zero-based box and
    /// centered on `center`. Later duplicates of a coordinate win.
    pub fn paste<I>(pixels: I, center: Coord) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32, Color)>,
    {
        let mut unique: HashMap<Coord, Color> = HashMap::new();
        for (x, y, color) in pixels {
            unique.insert((x, y), color);
        }
        let bounds = IRect::bounding(unique.keys().copied())?;

        let mut pixels: Vec<FloatingPixel> = unique
            .into_iter()
            .map(|((x, y), color)| FloatingPixel {
                dx: x - bounds.x,
                dy: y - bounds.y,
                color,
            })
            .collect();
        pixels.sort_by_key(|p| (p.dy, p.dx));

        Some(Self {
            pixels,
            anchor: (
                center.0.saturating_sub(bounds.w / 2),
                center.1.saturating_sub(bounds.h / 2),
            ),
            width: bounds.w,
            height: bounds.h,
            source: None,
        })
    }

    /// Stamp every buffer pixel onto `layer` at the current anchor.
    ///
    /// Returns `None` (and leaves the layer untouched) if the layer rejects writes.
    pub fn anchor_to(&self, project: &mut Project, layer: LayerId) -> Option<Anchored> {
        if !project.is_layer_editable(layer) {
            return None;
        }
        let mut overwritten = Vec::with_capacity(self.pixels.len());
        let mut writes = Vec::with_capacity(self.pixels.len());
        for (x, y, color) in self.world_pixels() {
            overwritten.push(StampRecord {
                x,
                y,
                previous: project.get_pixel(layer, x, y),
                stamped: color,
            });
            writes.push(PixelWrite::paint(layer, x, y, color));
        }
        let deltas = project.set_pixel_batch(writes);
        log::debug!(
            "anchored {} pixels at {:?} onto layer {:?}",
            overwritten.len(),
            self.anchor,
            layer
        );
        Some(Anchored {
            deltas,
            overwritten,
        })
    }

    pub fn pixels(&self) -> &[FloatingPixel] {
        &self.pixels
    }

    /// Pixels at their current world position.
    pub fn world_pixels(&self) -> impl Iterator<Item = (i32, i32, Color)> + '_ {
        let (ax, ay) = self.anchor;
        self.pixels
            .iter()
            .map(move |p| (ax.saturating_add(p.dx), ay.saturating_add(p.dy), p.color))
    }

    pub fn anchor(&self) -> Coord {
        self.anchor
    }

    /// World rectangle currently covered by the buffer.
    pub fn bounds(&self) -> IRect {
        IRect::new(self.anchor.0, self.anchor.1, self.width, self.height)
    }

    /// Layer the pixels were lifted from; `None` for pasted buffers.
    pub fn source(&self) -> Option<LayerId> {
        self.source
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Blend the buffer over a composed raster covering `viewport`.
    pub fn overlay_onto(&self, image: &mut ColorImage, viewport: IRect) {
        let w = image.size[0];
        for (x, y, color) in self.world_pixels() {
            if !viewport.contains(x, y) {
                continue;
            }
            let idx = (y - viewport.y) as usize * w + (x - viewport.x) as usize;
            if let Some(dst) = image.pixels.get_mut(idx) {
                *dst = alpha_over(color.to_color32(), *dst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn project_with(cells: &[(i32, i32, Color)]) -> (Project, LayerId) {
        let mut project = Project::new("float");
        let layer = project.active_layer;
        for &(x, y, c) in cells {
            project.set_pixel(layer, x, y, Some(c));
        }
        (project, layer)
    }

    #[test]
    fn lift_moves_pixels_out_of_the_layer() {
        let (mut project, layer) = project_with(&[(2, 3, RED), (3, 3, BLUE)]);
        let lifted = FloatingBuffer::lift(&mut project, layer, &[(2, 3), (3, 3), (4, 3)]).unwrap();
        assert_eq!(lifted.deltas.len(), 2);
        assert!(project.layer(layer).unwrap().is_empty());
        assert_eq!(lifted.buffer.anchor(), (2, 3));
        assert_eq!(lifted.buffer.bounds(), IRect::new(2, 3, 3, 1));
        assert_eq!(lifted.buffer.pixels()[1], FloatingPixel { dx: 1, dy: 0, color: BLUE });
    }

    #[test]
    fn lift_then_anchor_in_place_restores_layer() {
        let cells = [(0, 0, RED), (1, 0, BLUE), (0, 1, BLUE), (1, 1, RED)];
        let (mut project, layer) = project_with(&cells);
        let before: HashMap<Coord, Color> = project.layer(layer).unwrap().pixels().collect();

        let coords: Vec<Coord> = cells.iter().map(|&(x, y, _)| (x, y)).collect();
        let lifted = FloatingBuffer::lift(&mut project, layer, &coords).unwrap();
        let anchored = lifted.buffer.anchor_to(&mut project, layer).unwrap();

        let after: HashMap<Coord, Color> = project.layer(layer).unwrap().pixels().collect();
        assert_eq!(before, after);
        assert_eq!(anchored.overwritten.len(), 4);
        for record in &anchored.overwritten {
            assert_eq!(record.previous, None);
            assert_eq!(Some(record.stamped), before.get(&(record.x, record.y)).copied());
        }
    }

    #[test]
    fn lift_from_locked_layer_is_refused() {
        let (mut project, layer) = project_with(&[(0, 0, RED)]);
        project.set_layer_locked(layer, true);
        assert!(FloatingBuffer::lift(&mut project, layer, &[(0, 0)]).is_none());
        assert_eq!(project.get_pixel(layer, 0, 0), Some(RED));
    }

    #[test]
    fn paste_normalizes_and_centers() {
        let buffer = FloatingBuffer::paste(
            [(10, 10, RED), (13, 11, BLUE), (10, 10, BLUE)],
            (0, 0),
        )
        .unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.bounds(), IRect::new(-2, -1, 4, 2));
        assert_eq!(buffer.pixels()[0], FloatingPixel { dx: 0, dy: 0, color: BLUE });
        assert_eq!(buffer.source(), None);
        assert!(FloatingBuffer::paste(std::iter::empty(), (0, 0)).is_none());
    }

    #[test]
    fn anchor_records_overwritten_pixels() {
        let (mut project, layer) = project_with(&[(0, 0, BLUE)]);
        let buffer = FloatingBuffer::paste([(0, 0, RED)], (0, 0)).unwrap();
        let anchored = buffer.anchor_to(&mut project, layer).unwrap();
        assert_eq!(anchored.overwritten[0].previous, Some(BLUE));
        assert_eq!(anchored.deltas.len(), 1);
        assert_eq!(project.get_pixel(layer, 0, 0), Some(RED));
    }
}
