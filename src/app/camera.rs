use crate::utils::geometry::{Coord, IRect, Vec2};

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 64.0;

/// Maps screen points to world cells. `pan` is the world position under the
/// screen origin, `zoom` is screen points per cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::new(0.0, 0.0),
            zoom: 8.0,
        }
    }
}

impl Camera {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.pan + screen / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pan) * self.zoom
    }

    /// The cell under a screen point.
    pub fn cell_at(&self, screen: Vec2) -> Coord {
        let w = self.screen_to_world(screen);
        (w.x.floor() as i32, w.y.floor() as i32)
    }

    /// Drag the view by a screen-space delta.
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.pan = self.pan - screen_delta / self.zoom;
    }

    /// Multiply zoom by `factor`, keeping the world point under `focus` fixed.
    pub fn zoom_at(&mut self, focus: Vec2, factor: f32) {
        let before = self.screen_to_world(focus);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = before - focus / self.zoom;
    }

    /// Every cell at least partly visible in a `size`-point screen.
    pub fn viewport(&self, size: Vec2) -> IRect {
        let min = self.pan;
        let max = self.screen_to_world(size);
        IRect::from_min_max(
            min.x.floor() as i32,
            min.y.floor() as i32,
            max.x.ceil() as i32,
            max.y.ceil() as i32,
        )
    }

    /// World cell at the middle of a `size`-point screen.
    pub fn center(&self, size: Vec2) -> Coord {
        self.cell_at(size / 2.0)
    }
}
