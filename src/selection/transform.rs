use crate::selection::floating::FloatingBuffer;
use crate::utils::geometry::Coord;

/// Edits applied to a floating buffer before it is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatTransform {
    Translate { dx: i32, dy: i32 },
    MoveTo(Coord),
    FlipHorizontal,
    FlipVertical,
    /// Quarter turn clockwise around the buffer's top-left corner.
    RotateCw,
}

impl FloatingBuffer {
    pub fn transform(&mut self, op: FloatTransform) {
        match op {
            FloatTransform::Translate { dx, dy } => {
                self.anchor = (self.anchor.0.saturating_add(dx), self.anchor.1.saturating_add(dy));
            }
            FloatTransform::MoveTo(origin) => {
                self.anchor = origin;
            }
            FloatTransform::FlipHorizontal => {
                let w = self.width;
                for p in &mut self.pixels {
                    p.dx = w - 1 - p.dx;
                }
            }
            FloatTransform::FlipVertical => {
                let h = self.height;
                for p in &mut self.pixels {
                    p.dy = h - 1 - p.dy;
                }
            }
            FloatTransform::RotateCw => {
                let h = self.height;
                for p in &mut self.pixels {
                    let (dx, dy) = (p.dx, p.dy);
                    p.dx = h - 1 - dy;
                    p.dy = dx;
                }
                std::mem::swap(&mut self.width, &mut self.height);
            }
        }
        self.pixels.sort_by_key(|p| (p.dy, p.dx));
    }
}
