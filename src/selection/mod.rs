pub mod floating;
pub mod transform;

use std::collections::{HashSet, VecDeque};

use crate::canvas::project::Layer;
use crate::utils::geometry::{Coord, IRect};
use crate::utils::profiler::ScopeTimer;

pub const DEFAULT_SELECT_LIMIT: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Neighbors must match the seed color exactly.
    Color,
    /// Any non-empty neighbor joins the region.
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOptions {
    pub mode: SelectMode,
    pub diagonal: bool,
    pub max_cells: usize,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            mode: SelectMode::Color,
            diagonal: false,
            max_cells: DEFAULT_SELECT_LIMIT,
        }
    }
}

/// Unit edge between two grid-line points; cell `(x, y)` spans `x..x+1`, `y..y+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub from: Coord,
    pub to: Coord,
}

/// A contiguous region of cells with its bounds and boundary outline.
#[derive(Debug, Clone)]
pub struct Selection {
    cells: Vec<Coord>,
    members: HashSet<Coord>,
    pub bounds: IRect,
    pub outline: Vec<Segment>,
    /// The visit cap stopped the search before the region was exhausted.
    pub truncated: bool,
}

impl Selection {
    /// Build from an arbitrary cell set. Returns `None` when empty.
    pub fn from_cells<I: IntoIterator<Item = Coord>>(cells: I) -> Option<Self> {
        let mut members = HashSet::new();
        let cells: Vec<Coord> = cells.into_iter().filter(|c| members.insert(*c)).collect();
        Self::from_parts(cells, members, false)
    }

    fn from_parts(cells: Vec<Coord>, members: HashSet<Coord>, truncated: bool) -> Option<Self> {
        let bounds = IRect::bounding(cells.iter().copied())?;
        let outline = outline_of(&cells, &members);
        Some(Self {
            cells,
            members,
            bounds,
            outline,
            truncated,
        })
    }

    /// Cells in visit order.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.members.contains(&(x, y))
    }
}

/// Contiguous region growth from a seed cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContiguousSelect {
    pub options: SelectOptions,
}

impl ContiguousSelect {
    pub fn new(options: SelectOptions) -> Self {
        Self { options }
    }

    /// Breadth-first search from `seed`. An empty seed selects nothing.
    pub fn run(&self, layer: &Layer, seed: Coord) -> Option<Selection> {
        let _timer = ScopeTimer::new("contiguous_select");
        let seed_color = layer.pixel(seed.0, seed.1)?;
        let opts = self.options;
        let limit = opts.max_cells.max(1);

        let accepts = |x: i32, y: i32| match (opts.mode, layer.pixel(x, y)) {
            (SelectMode::Color, Some(c)) => c == seed_color,
            (SelectMode::Content, Some(_)) => true,
            (_, None) => false,
        };

        let mut members = HashSet::new();
        let mut cells = Vec::new();
        let mut queue = VecDeque::new();
        members.insert(seed);
        cells.push(seed);
        queue.push_back(seed);
        let mut truncated = false;

        'search: while let Some((cx, cy)) = queue.pop_front() {
            for (dx, dy) in neighbor_offsets(opts.diagonal) {
                let (Some(nx), Some(ny)) = (cx.checked_add(*dx), cy.checked_add(*dy)) else {
                    continue;
                };
                let next = (nx, ny);
                if members.contains(&next) || !accepts(next.0, next.1) {
                    continue;
                }
                if cells.len() >= limit {
                    truncated = true;
                    break 'search;
                }
                members.insert(next);
                cells.push(next);
                queue.push_back(next);
            }
        }

        if truncated {
            log::warn!(
                "contiguous select from {:?} stopped at the {limit}-cell limit",
                seed
            );
        }
        log::debug!("selected {} cells from {:?}", cells.len(), seed);
        Selection::from_parts(cells, members, truncated)
    }
}

fn neighbor_offsets(diagonal: bool) -> &'static [(i32, i32)] {
    const ORTHO: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    const ALL: [(i32, i32); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];
    if diagonal { &ALL[..] } else { &ORTHO[..] }
}

/// One unit segment per cell side whose orthogonal neighbor is outside the set.
///
/// Grid-line coordinates past the last column or row saturate at `i32::MAX`.
fn outline_of(cells: &[Coord], members: &HashSet<Coord>) -> Vec<Segment> {
    let mut segments = Vec::new();
    for &(x, y) in cells {
        let (x1, y1) = (x.saturating_add(1), y.saturating_add(1));
        let outside = |cell: Option<Coord>| cell.is_none_or(|c| !members.contains(&c));
        if outside(y.checked_sub(1).map(|up| (x, up))) {
            segments.push(Segment {
                from: (x, y),
                to: (x1, y),
            });
        }
        if outside(x.checked_add(1).map(|right| (right, y))) {
            segments.push(Segment {
                from: (x1, y),
                to: (x1, y1),
            });
        }
        if outside(y.checked_add(1).map(|down| (x, down))) {
            segments.push(Segment {
                from: (x1, y1),
                to: (x, y1),
            });
        }
        if outside(x.checked_sub(1).map(|left| (left, y))) {
            segments.push(Segment {
                from: (x, y1),
                to: (x, y),
            });
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::project::LayerId;
    use crate::utils::color::Color;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn layer_with(cells: &[(i32, i32, Color)]) -> Layer {
        let mut layer = Layer::new(LayerId(1), "sel");
        for &(x, y, c) in cells {
            layer.write(x, y, Some(c));
        }
        layer
    }

    #[test]
    fn plus_shape_has_twelve_outline_segments() {
        let layer = layer_with(&[
            (5, 5, RED),
            (4, 5, RED),
            (6, 5, RED),
            (5, 4, RED),
            (5, 6, RED),
        ]);
        let sel = ContiguousSelect::default().run(&layer, (5, 5)).unwrap();
        assert_eq!(sel.len(), 5);
        assert_eq!(sel.bounds, IRect::new(4, 4, 3, 3));
        assert_eq!(sel.outline.len(), 12);
    }

    #[test]
    fn rectangle_outline_is_its_perimeter() {
        let mut cells = Vec::new();
        for y in -2..3 {
            for x in 0..7 {
                cells.push((x, y, BLUE));
            }
        }
        let layer = layer_with(&cells);
        let sel = ContiguousSelect::default().run(&layer, (3, 0)).unwrap();
        assert_eq!(sel.outline.len(), 2 * (7 + 5));
    }

    #[test]
    fn ring_outline_includes_the_hole() {
        let mut cells = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) {
                    cells.push((x, y, RED));
                }
            }
        }
        let sel = Selection::from_cells(cells.iter().map(|&(x, y, _)| (x, y))).unwrap();
        assert_eq!(sel.outline.len(), 12 + 4);
    }

    #[test]
    fn color_mode_stops_at_other_colors_content_mode_does_not() {
        let layer = layer_with(&[(0, 0, RED), (1, 0, BLUE), (2, 0, RED)]);
        let color = ContiguousSelect::default().run(&layer, (0, 0)).unwrap();
        assert_eq!(color.len(), 1);

        let content = ContiguousSelect::new(SelectOptions {
            mode: SelectMode::Content,
            ..Default::default()
        })
        .run(&layer, (0, 0))
        .unwrap();
        assert_eq!(content.len(), 3);
    }

    #[test]
    fn diagonal_connectivity_joins_corners() {
        let layer = layer_with(&[(0, 0, RED), (1, 1, RED)]);
        assert_eq!(ContiguousSelect::default().run(&layer, (0, 0)).unwrap().len(), 1);
        let diag = ContiguousSelect::new(SelectOptions {
            diagonal: true,
            ..Default::default()
        });
        let sel = diag.run(&layer, (0, 0)).unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.outline.len(), 8);
    }

    #[test]
    fn visit_cap_truncates() {
        let cells: Vec<_> = (0..100).map(|x| (x, 0, RED)).collect();
        let layer = layer_with(&cells);
        let sel = ContiguousSelect::new(SelectOptions {
            max_cells: 10,
            ..Default::default()
        })
        .run(&layer, (0, 0))
        .unwrap();
        assert_eq!(sel.len(), 10);
        assert!(sel.truncated);
    }

    #[test]
    fn selects_at_the_grid_corner() {
        let layer = layer_with(&[
            (i32::MAX, i32::MAX, RED),
            (i32::MAX - 1, i32::MAX, RED),
            (i32::MIN, i32::MIN, RED),
        ]);
        let diag = ContiguousSelect::new(SelectOptions {
            diagonal: true,
            ..Default::default()
        });
        let sel = diag.run(&layer, (i32::MAX, i32::MAX)).unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.bounds, IRect::new(i32::MAX - 1, i32::MAX, 2, 1));
        assert_eq!(sel.outline.len(), 6);

        let low = diag.run(&layer, (i32::MIN, i32::MIN)).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low.outline.len(), 4);
    }

    #[test]
    fn empty_seed_selects_nothing() {
        let layer = layer_with(&[(0, 0, RED)]);
        assert!(ContiguousSelect::default().run(&layer, (4, 4)).is_none());
    }
}
