use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Integer world-grid coordinate `(x, y)`.
pub type Coord = (i32, i32);

/// Axis-aligned rectangle on the world grid. `x + w` and `y + h` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from an inclusive min corner and exclusive max corner.
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self::from_min_end(min_x, min_y, max_x as i64, max_y as i64)
    }

    /// Like [`IRect::from_min_max`] with a widened exclusive end, so a rect
    /// may reach the last grid column. Extents past `i32::MAX` are clamped.
    fn from_min_end(min_x: i32, min_y: i32, end_x: i64, end_y: i64) -> Self {
        let limit = i32::MAX as i64;
        let span = |min: i32, end: i64| (end.min(limit + 1) - min as i64).clamp(0, limit) as i32;
        Self {
            x: min_x,
            y: min_y,
            w: span(min_x, end_x),
            h: span(min_y, end_y),
        }
    }

    /// The single-cell rect at `(x, y)`.
    pub fn cell(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// Exclusive max column, saturated at `i32::MAX`.
    pub fn max_x(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn max_y(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    fn end_x(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    fn end_y(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.w as usize * self.h as usize
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && (x as i64) < self.end_x() && y >= self.y && (y as i64) < self.end_y()
    }

    pub fn intersects(&self, other: &IRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (self.x as i64) < other.end_x()
            && (other.x as i64) < self.end_x()
            && (self.y as i64) < other.end_y()
            && (other.y as i64) < self.end_y()
    }

    pub fn intersection(&self, other: &IRect) -> Option<IRect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self::from_min_end(
            self.x.max(other.x),
            self.y.max(other.y),
            self.end_x().min(other.end_x()),
            self.end_y().min(other.end_y()),
        ))
    }

    pub fn union(&self, other: &IRect) -> IRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_min_end(
            self.x.min(other.x),
            self.y.min(other.y),
            self.end_x().max(other.end_x()),
            self.end_y().max(other.end_y()),
        )
    }

    /// Grow by `pad` cells on every side, stopping at the grid limits.
    pub fn expand(&self, pad: i32) -> IRect {
        Self::from_min_end(
            self.x.saturating_sub(pad),
            self.y.saturating_sub(pad),
            self.end_x() + pad as i64,
            self.end_y() + pad as i64,
        )
    }

    /// Center cell, rounding toward the min corner.
    pub fn center(&self) -> Coord {
        (self.x.saturating_add(self.w / 2), self.y.saturating_add(self.h / 2))
    }

    /// Smallest rect covering every coordinate, `None` for an empty iterator.
    pub fn bounding<I: IntoIterator<Item = Coord>>(coords: I) -> Option<IRect> {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        let mut found = false;
        for (x, y) in coords {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            found = true;
        }
        found.then(|| Self::from_min_end(min_x, min_y, max_x as i64 + 1, max_y as i64 + 1))
    }
}

/// Lightweight 2D vector for screen/camera-space positions.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

/// Cells visited by a Bresenham line from `from` to `to`, both ends included.
pub fn line_cells(from: Coord, to: Coord) -> Vec<Coord> {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut x = x0;
    let mut y = y0;
    loop {
        cells.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}
