use crate::fill::grid::ObstacleGrid;
use crate::utils::geometry::Coord;

/// Span-based flood over the open cells of `grid` reachable from local `seed`.
///
/// Returns a row-major mask of filled cells. With `wrap`, stepping off one
/// edge re-enters from the opposite edge on both axes.
pub fn scanline_fill(grid: &ObstacleGrid, seed: Coord, diagonal: bool, wrap: bool) -> Vec<bool> {
    let (w, h) = (grid.width(), grid.height());
    let mut filled = vec![false; grid.bounds().area()];
    if grid.is_occupied(seed.0, seed.1) {
        return filled;
    }

    let step = |v: i32, delta: i32, len: i32| -> Option<i32> {
        let n = v + delta;
        if (0..len).contains(&n) {
            Some(n)
        } else if wrap {
            Some(n.rem_euclid(len))
        } else {
            None
        }
    };

    let mut stack = vec![seed];
    let mut span = Vec::new();
    while let Some((x, y)) = stack.pop() {
        if !is_open(grid, &filled, x, y) {
            continue;
        }
        span.clear();
        filled[grid.index(x, y)] = true;
        span.push(x);

        for dir in [-1, 1] {
            let mut cx = x;
            while let Some(nx) = step(cx, dir, w) {
                if !is_open(grid, &filled, nx, y) {
                    break;
                }
                filled[grid.index(nx, y)] = true;
                span.push(nx);
                cx = nx;
            }
        }

        for dy in [-1, 1] {
            let Some(ny) = step(y, dy, h) else {
                continue;
            };
            for &sx in &span {
                if is_open(grid, &filled, sx, ny) {
                    stack.push((sx, ny));
                }
                if diagonal {
                    for dx in [-1, 1] {
                        if let Some(nx) = step(sx, dx, w) {
                            if is_open(grid, &filled, nx, ny) {
                                stack.push((nx, ny));
                            }
                        }
                    }
                }
            }
        }
    }
    filled
}

fn is_open(grid: &ObstacleGrid, filled: &[bool], x: i32, y: i32) -> bool {
    !grid.is_occupied(x, y) && !filled[grid.index(x, y)]
}
