pub mod gap_close;
pub mod grid;
pub mod scanline;

use crate::canvas::pixel_store::PixelWrite;
use crate::canvas::project::{Frame, LayerId};
use crate::fill::gap_close::GapCloseParams;
use crate::fill::grid::ObstacleGrid;
use crate::utils::color::Color;
use crate::utils::geometry::{Coord, IRect};
use crate::utils::profiler::ScopeTimer;

/// Cells of slack around layer content for fills outside a tiled region.
pub const DEFAULT_FILL_PADDING: i32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOptions {
    pub diagonal: bool,
    /// Run the gap-closing pre-pass. Ignored inside tiled regions.
    pub smart: bool,
    pub padding: i32,
    pub gap_close: GapCloseParams,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            diagonal: false,
            smart: false,
            padding: DEFAULT_FILL_PADDING,
            gap_close: GapCloseParams::default(),
        }
    }
}

/// The writes a fill would make, computed without touching the project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillPlan {
    /// Region the fill was confined to; `None` when nothing was planned.
    pub bounds: Option<IRect>,
    pub wrapped: bool,
    pub gaps_closed: usize,
    /// Row-major within `bounds`.
    pub writes: Vec<PixelWrite>,
}

impl FillPlan {
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloodFill {
    pub options: FillOptions,
}

impl FloodFill {
    pub fn new(options: FillOptions) -> Self {
        Self { options }
    }

    /// Plan a bucket fill of `color` from `seed` on `layer`.
    ///
    /// Nothing is planned when the layer is missing, locked or hidden, or when
    /// the seed already holds `color`.
    pub fn fill(&self, frame: &Frame, layer: LayerId, seed: Coord, color: Color) -> FillPlan {
        let _timer = ScopeTimer::new("flood_fill");
        let Some(target_layer) = frame.layer(layer) else {
            return FillPlan::default();
        };
        if !target_layer.is_editable() {
            return FillPlan::default();
        }
        let target = target_layer.pixel(seed.0, seed.1);
        if target == Some(color) {
            return FillPlan::default();
        }

        let (bounds, wrapped) =
            grid::resolve_bounds(frame, target_layer, seed, self.options.padding);
        let mut obstacles = ObstacleGrid::build(target_layer, bounds, target);
        let local_seed = obstacles.to_local(seed.0, seed.1);

        let gaps_closed = if self.options.smart && !wrapped {
            gap_close::close_gaps(&mut obstacles, local_seed, &self.options.gap_close)
        } else {
            0
        };

        let mask = scanline::scanline_fill(&obstacles, local_seed, self.options.diagonal, wrapped);
        let writes: Vec<PixelWrite> = mask
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(|(i, _)| {
                let lx = i as i32 % bounds.w;
                let ly = i as i32 / bounds.w;
                let (x, y) = obstacles.to_world(lx, ly);
                PixelWrite::paint(layer, x, y, color)
            })
            .collect();

        log::debug!(
            "fill from {:?}: {} cells in {:?} (wrapped: {wrapped}, gaps closed: {gaps_closed})",
            seed,
            writes.len(),
            bounds
        );
        FillPlan {
            bounds: Some(bounds),
            wrapped,
            gaps_closed,
            writes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::project::{Border, BorderKind, Project};

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);

    fn tiled_project(w: i32, h: i32) -> (Project, LayerId) {
        let mut project = Project::new("fill");
        project.frame_mut().borders.push(Border {
            rect: IRect::new(0, 0, w, h),
            kind: BorderKind::EffectZone,
            wrap: true,
        });
        let layer = project.active_layer;
        (project, layer)
    }

    #[test]
    fn empty_tiled_region_fills_every_cell() {
        let (project, layer) = tiled_project(8, 8);
        let plan = FloodFill::default().fill(project.frame(), layer, (3, 3), RED);
        assert!(plan.wrapped);
        assert_eq!(plan.len(), 64);
        assert!(plan.writes.iter().all(|w| IRect::new(0, 0, 8, 8).contains(w.x, w.y)));
        assert_eq!((plan.writes[0].x, plan.writes[0].y), (0, 0));
    }

    #[test]
    fn fill_wraps_around_a_tiled_wall() {
        let (mut project, layer) = tiled_project(6, 3);
        for y in 0..3 {
            project.set_pixel(layer, 3, y, Some(GREEN));
        }
        let plan = FloodFill::default().fill(project.frame(), layer, (1, 1), RED);
        assert_eq!(plan.len(), 15);
        assert!(plan.writes.iter().any(|w| (w.x, w.y) == (5, 0)));
    }

    #[test]
    fn enclosed_box_fills_only_interior() {
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        for i in 0..12 {
            project.set_pixel(layer, i, 0, Some(GREEN));
            project.set_pixel(layer, i, 11, Some(GREEN));
            project.set_pixel(layer, 0, i, Some(GREEN));
            project.set_pixel(layer, 11, i, Some(GREEN));
        }
        let plan = FloodFill::default().fill(project.frame(), layer, (5, 5), RED);
        assert!(!plan.wrapped);
        assert_eq!(plan.len(), 100);
    }

    #[test]
    fn recolor_stays_within_matching_region() {
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        for x in 0..4 {
            project.set_pixel(layer, x, 0, Some(GREEN));
        }
        project.set_pixel(layer, 4, 0, Some(RED));
        let plan = FloodFill::default().fill(project.frame(), layer, (0, 0), RED);
        assert_eq!(plan.len(), 4);
        assert!(plan.writes.iter().all(|w| w.y == 0 && w.x < 4));
    }

    #[test]
    fn same_color_or_locked_layer_plans_nothing() {
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        project.set_pixel(layer, 0, 0, Some(RED));
        let fill = FloodFill::default();
        assert!(fill.fill(project.frame(), layer, (0, 0), RED).is_empty());

        project.set_layer_locked(layer, true);
        let plan = fill.fill(project.frame(), layer, (2, 2), GREEN);
        assert!(plan.is_empty());
        assert_eq!(plan.bounds, None);

        assert!(fill.fill(project.frame(), LayerId(99), (0, 0), GREEN).is_empty());
    }

    #[test]
    fn smart_fill_seals_a_one_cell_gap() {
        // Wall square of radius 10 around the origin, missing (10, 0).
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        for i in -10..=10 {
            project.set_pixel(layer, i, -10, Some(GREEN));
            project.set_pixel(layer, i, 10, Some(GREEN));
            project.set_pixel(layer, -10, i, Some(GREEN));
            if i != 0 {
                project.set_pixel(layer, 10, i, Some(GREEN));
            }
        }
        let frame = project.frame();

        let plain = FloodFill::default().fill(frame, layer, (0, 0), RED);
        assert!(plain.len() > 361);

        let smart = FloodFill::new(FillOptions {
            smart: true,
            ..Default::default()
        })
        .fill(frame, layer, (0, 0), RED);
        assert!(smart.gaps_closed >= 1);
        assert_eq!(smart.len(), 19 * 19);
    }

    #[test]
    fn fill_far_from_content_is_confined_to_the_seed_neighbourhood() {
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        project.set_pixel(layer, 0, 0, Some(GREEN));
        let plan = FloodFill::default().fill(project.frame(), layer, (5000, 5000), RED);
        assert_eq!(plan.bounds, Some(IRect::new(4936, 4936, 129, 129)));
        assert_eq!(plan.len(), 129 * 129);
    }

    #[test]
    fn fill_next_to_the_grid_edge() {
        let mut project = Project::new("fill");
        let layer = project.active_layer;
        project.set_pixel(layer, i32::MAX, 0, Some(GREEN));

        let near_origin = FloodFill::default().fill(project.frame(), layer, (0, 0), RED);
        assert_eq!(near_origin.len(), 129 * 129);

        let at_edge = FloodFill::default().fill(project.frame(), layer, (i32::MAX - 1, 0), RED);
        assert_eq!(at_edge.bounds, Some(IRect::new(i32::MAX - 64, -64, 65, 129)));
        assert_eq!(at_edge.len(), 65 * 129 - 1);
        assert!(at_edge.writes.iter().all(|w| (w.x, w.y) != (i32::MAX, 0)));
    }

    #[test]
    fn smart_mode_is_ignored_in_tiled_regions() {
        let (project, layer) = tiled_project(8, 8);
        let plan = FloodFill::new(FillOptions {
            smart: true,
            ..Default::default()
        })
        .fill(project.frame(), layer, (0, 0), RED);
        assert_eq!(plan.gaps_closed, 0);
        assert_eq!(plan.len(), 64);
    }
}
