//! Smart-fill pre-pass: plug small contour gaps around the seed before filling.

use std::f32::consts::TAU;

use crate::fill::grid::ObstacleGrid;
use crate::utils::geometry::{line_cells, Coord};

/// Sampling step along a ray, in cells. Below 1 so thin diagonal walls are not skipped.
const RAY_STEP: f32 = 0.5;

/// Tunable constants of the gap heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapCloseParams {
    pub rays: usize,
    /// A ray is a leak when it travels further than `leak_factor` times the
    /// shortest valid hit distance...
    pub leak_factor: f32,
    /// ...and further than this many cells.
    pub min_leak_distance: f32,
    /// Fewer valid hits than this and the pass is skipped.
    pub min_hits: usize,
}

impl Default for GapCloseParams {
    fn default() -> Self {
        Self {
            rays: 32,
            leak_factor: 3.5,
            min_leak_distance: 8.0,
            min_hits: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Stop cell (local): the occupied cell hit, or the last in-grid cell.
    pub end: Coord,
    pub distance: f32,
    pub hit: bool,
}

/// Cast `count` equidistant rays from the center of the local `seed` cell.
pub fn cast_rays(grid: &ObstacleGrid, seed: Coord, count: usize) -> Vec<Ray> {
    (0..count)
        .map(|i| cast(grid, seed, TAU * i as f32 / count as f32))
        .collect()
}

fn cast(grid: &ObstacleGrid, seed: Coord, angle: f32) -> Ray {
    let (dir_y, dir_x) = angle.sin_cos();
    let ox = seed.0 as f32 + 0.5;
    let oy = seed.1 as f32 + 0.5;
    let mut last = seed;
    let mut t = 0.0;
    loop {
        t += RAY_STEP;
        let cx = (ox + dir_x * t).floor() as i32;
        let cy = (oy + dir_y * t).floor() as i32;
        if !grid.in_grid(cx, cy) {
            return Ray {
                end: last,
                distance: t - RAY_STEP,
                hit: false,
            };
        }
        if grid.is_occupied(cx, cy) {
            return Ray {
                end: (cx, cy),
                distance: t,
                hit: true,
            };
        }
        last = (cx, cy);
    }
}

/// Run the gap heuristic, marking bridging lines as occupied in `grid`.
///
/// Returns the number of lines drawn; zero when fewer than `min_hits` rays
/// reach an obstacle.
pub fn close_gaps(grid: &mut ObstacleGrid, seed: Coord, params: &GapCloseParams) -> usize {
    if params.rays == 0 {
        return 0;
    }
    let rays = cast_rays(grid, seed, params.rays);
    let hits = rays.iter().filter(|r| r.hit).count();
    if hits < params.min_hits.max(1) {
        log::debug!("gap close skipped: {hits} ray hits");
        return 0;
    }

    let min_hit = rays
        .iter()
        .filter(|r| r.hit)
        .map(|r| r.distance)
        .fold(f32::INFINITY, f32::min);
    let threshold = (params.leak_factor * min_hit).max(params.min_leak_distance);
    let anchors: Vec<usize> = (0..rays.len())
        .filter(|&i| rays[i].distance <= threshold)
        .collect();

    let n = rays.len();
    let mut lines = 0;
    for (k, &from) in anchors.iter().enumerate() {
        let to = anchors[(k + 1) % anchors.len()];
        let span = (to + n - from) % n;
        if span <= 1 {
            continue;
        }
        for cell in line_cells(rays[from].end, rays[to].end) {
            if cell != seed {
                grid.occupy(cell.0, cell.1);
            }
        }
        lines += 1;
    }
    if lines > 0 {
        log::debug!("gap close drew {lines} lines (threshold {threshold:.1})");
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::geometry::IRect;

    #[test]
    fn rays_stop_at_edges_in_an_open_grid() {
        let grid = ObstacleGrid::open(IRect::new(0, 0, 11, 11));
        let rays = cast_rays(&grid, (5, 5), 4);
        assert!(rays.iter().all(|r| !r.hit));
        assert_eq!(rays[0].end, (10, 5));
        assert_eq!(rays[1].end, (5, 10));
    }

    #[test]
    fn too_few_hits_leave_grid_untouched() {
        let mut grid = ObstacleGrid::open(IRect::new(0, 0, 41, 41));
        grid.occupy(30, 20);
        let before = grid.clone();
        assert_eq!(close_gaps(&mut grid, (20, 20), &GapCloseParams::default()), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn leak_through_a_wall_gap_is_bridged() {
        // Square wall of radius 10 around (50, 50) missing one cell at (60, 50).
        let mut grid = ObstacleGrid::open(IRect::new(0, 0, 101, 101));
        for i in 40..=60 {
            grid.occupy(i, 40);
            grid.occupy(i, 60);
            grid.occupy(40, i);
            if i != 50 {
                grid.occupy(60, i);
            }
        }
        assert!(!grid.is_occupied(60, 50));
        let lines = close_gaps(&mut grid, (50, 50), &GapCloseParams::default());
        assert!(lines >= 1);
        assert!(grid.is_occupied(60, 50));
    }
}
