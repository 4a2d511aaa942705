use crate::canvas::project::{Frame, Layer};
use crate::utils::color::Color;
use crate::utils::geometry::{Coord, IRect};

/// Largest padded content box a fill will allocate a grid for.
pub const MAX_FILL_AREA: usize = 1 << 24;

/// Decide the region a fill may touch.
///
/// A seed inside a wrap-flagged border gets that exact rectangle with
/// toroidal adjacency. Otherwise the fill is confined to the layer's content
/// bounds padded by `padding`; a seed outside that box (or a box larger than
/// [`MAX_FILL_AREA`]) gets only the `padding` neighbourhood of the seed.
pub fn resolve_bounds(frame: &Frame, layer: &Layer, seed: Coord, padding: i32) -> (IRect, bool) {
    if let Some(region) = frame.tiled_region_at(seed.0, seed.1) {
        return (region, true);
    }
    let padding = padding.max(0);
    let around_seed = IRect::cell(seed.0, seed.1).expand(padding);
    let padded = layer
        .content_bounds()
        .map(|content| content.expand(padding))
        .filter(|bounds| bounds.contains(seed.0, seed.1));
    match padded {
        Some(bounds) if bounds.area() <= MAX_FILL_AREA => (bounds, false),
        Some(bounds) => {
            log::warn!(
                "fill bounds {:?} exceed {MAX_FILL_AREA} cells, confining the fill around {:?}",
                bounds,
                seed
            );
            (around_seed, false)
        }
        None => (around_seed, false),
    }
}

/// Occupancy grid over a fill's bounds, addressed in local (bounds-relative) cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleGrid {
    bounds: IRect,
    occupied: Vec<bool>,
}

impl ObstacleGrid {
    /// A cell is occupied when it holds a color other than `target`; with no
    /// target color, any stored pixel is occupied.
    pub fn build(layer: &Layer, bounds: IRect, target: Option<Color>) -> Self {
        let mut grid = Self::open(bounds);
        if target.is_some() {
            grid.occupied.iter_mut().for_each(|c| *c = true);
        }
        for ((x, y), color) in layer.pixels() {
            if !bounds.contains(x, y) {
                continue;
            }
            let idx = grid.index(x - bounds.x, y - bounds.y);
            grid.occupied[idx] = match target {
                Some(t) => color != t,
                None => true,
            };
        }
        grid
    }

    /// A grid with every cell fillable.
    pub fn open(bounds: IRect) -> Self {
        Self {
            bounds,
            occupied: vec![false; bounds.area()],
        }
    }

    pub fn bounds(&self) -> IRect {
        self.bounds
    }

    pub fn width(&self) -> i32 {
        self.bounds.w
    }

    pub fn height(&self) -> i32 {
        self.bounds.h
    }

    pub fn in_grid(&self, lx: i32, ly: i32) -> bool {
        lx >= 0 && ly >= 0 && lx < self.bounds.w && ly < self.bounds.h
    }

    pub fn index(&self, lx: i32, ly: i32) -> usize {
        ly as usize * self.bounds.w as usize + lx as usize
    }

    /// Out-of-grid cells count as occupied.
    pub fn is_occupied(&self, lx: i32, ly: i32) -> bool {
        !self.in_grid(lx, ly) || self.occupied[self.index(lx, ly)]
    }

    pub fn occupy(&mut self, lx: i32, ly: i32) {
        if self.in_grid(lx, ly) {
            let idx = self.index(lx, ly);
            self.occupied[idx] = true;
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|c| **c).count()
    }

    pub fn to_local(&self, x: i32, y: i32) -> Coord {
        (x - self.bounds.x, y - self.bounds.y)
    }

    pub fn to_world(&self, lx: i32, ly: i32) -> Coord {
        (lx + self.bounds.x, ly + self.bounds.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::project::{Border, BorderKind, LayerId};

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn bounds_pad_content_around_a_nearby_seed() {
        let mut frame = Frame::default();
        let mut layer = Layer::new(LayerId(1), "l");
        layer.write(0, 0, Some(RED));
        layer.write(4, 2, Some(RED));
        frame.layers.push(layer.clone());

        let (bounds, wrap) = resolve_bounds(&frame, &layer, (1, 1), 2);
        assert!(!wrap);
        assert_eq!(bounds, IRect::new(-2, -2, 9, 7));

        let (edge, _) = resolve_bounds(&frame, &layer, (6, 4), 2);
        assert_eq!(edge, bounds);
    }

    #[test]
    fn distant_seed_gets_only_its_own_neighbourhood() {
        let mut frame = Frame::default();
        let mut layer = Layer::new(LayerId(1), "l");
        layer.write(0, 0, Some(RED));
        frame.layers.push(layer.clone());

        let (far, wrap) = resolve_bounds(&frame, &layer, (5000, 5000), 64);
        assert!(!wrap);
        assert_eq!(far, IRect::new(4936, 4936, 129, 129));

        let (just_outside, _) = resolve_bounds(&frame, &layer, (65, 0), 64);
        assert_eq!(just_outside, IRect::new(1, -64, 129, 129));

        let empty = Layer::new(LayerId(2), "e");
        assert_eq!(resolve_bounds(&frame, &empty, (3, 3), 1).0, IRect::new(2, 2, 3, 3));
    }

    #[test]
    fn oversized_content_falls_back_to_the_seed() {
        let mut frame = Frame::default();
        let mut layer = Layer::new(LayerId(1), "l");
        layer.write(0, 0, Some(RED));
        layer.write(100_000, 100_000, Some(RED));
        frame.layers.push(layer.clone());
        let (bounds, _) = resolve_bounds(&frame, &layer, (50_000, 50_000), 4);
        assert_eq!(bounds, IRect::new(49_996, 49_996, 9, 9));
    }

    #[test]
    fn tiled_border_wins_over_padding() {
        let mut frame = Frame::default();
        frame.borders.push(Border {
            rect: IRect::new(0, 0, 8, 8),
            kind: BorderKind::EffectZone,
            wrap: true,
        });
        let layer = Layer::new(LayerId(1), "l");
        assert_eq!(resolve_bounds(&frame, &layer, (3, 3), 64), (IRect::new(0, 0, 8, 8), true));
    }

    #[test]
    fn occupancy_depends_on_target_color() {
        let mut layer = Layer::new(LayerId(1), "l");
        layer.write(0, 0, Some(RED));
        layer.write(1, 0, Some(Color::BLACK));
        let bounds = IRect::new(0, 0, 3, 1);

        let empty_target = ObstacleGrid::build(&layer, bounds, None);
        assert!(empty_target.is_occupied(0, 0));
        assert!(empty_target.is_occupied(1, 0));
        assert!(!empty_target.is_occupied(2, 0));

        let red_target = ObstacleGrid::build(&layer, bounds, Some(RED));
        assert!(!red_target.is_occupied(0, 0));
        assert!(red_target.is_occupied(1, 0));
        assert!(red_target.is_occupied(2, 0));
        assert!(red_target.is_occupied(-1, 0));
    }
}
