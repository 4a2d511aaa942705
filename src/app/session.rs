use std::path::Path;

use eframe::egui::ColorImage;

use crate::app::camera::Camera;
use crate::app::events::{EditorEvent, EventBus};
use crate::app::settings::EngineSettings;
use crate::app::tools::Tool;
use crate::canvas::chunk_cache::{render_direct, ChunkCache};
use crate::canvas::history::{EditCommand, FloatingChange, History};
use crate::canvas::pixel_store::{PixelDelta, PixelWrite};
use crate::canvas::project::{LayerId, Project};
use crate::fill::{FillOptions, FloodFill};
use crate::selection::floating::FloatingBuffer;
use crate::selection::transform::FloatTransform;
use crate::selection::{ContiguousSelect, SelectMode, SelectOptions, Selection};
use crate::utils::color::Color;
use crate::utils::exporter::{save_color_image, ExportError, ExportFormat};
use crate::utils::geometry::{line_cells, Coord, IRect, Vec2};

/// A pointer drag in progress.
struct Interaction {
    tool: Tool,
    frame: usize,
    layer: LayerId,
    last: Coord,
    deltas: Vec<PixelDelta>,
}

/// Editing context: owns the document and every engine working on it.
///
/// All pixel changes go through here so the chunk cache, history and
/// subscribers see the same deltas.
pub struct Editor {
    project: Project,
    cache: ChunkCache,
    history: History,
    floating: Option<FloatingBuffer>,
    /// The floating buffer can be rebuilt by replaying history; false for pastes.
    floating_recorded: bool,
    selection: Option<Selection>,
    settings: EngineSettings,
    interaction: Option<Interaction>,
    viewport_size: Vec2,
    pub events: EventBus,
    pub camera: Camera,
    pub tool: Tool,
    pub color: Color,
}

impl Editor {
    pub fn new(project: Project, settings: EngineSettings) -> Self {
        Self {
            project,
            cache: ChunkCache::new(settings.chunk_size),
            history: History::new(settings.history_depth),
            floating: None,
            floating_recorded: false,
            selection: None,
            settings,
            interaction: None,
            viewport_size: Vec2::new(512.0, 512.0),
            events: EventBus::new(),
            camera: Camera::default(),
            tool: Tool::default(),
            color: Color::BLACK,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn floating(&self) -> Option<&FloatingBuffer> {
        self.floating.as_ref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_interacting(&self) -> bool {
        self.interaction.is_some()
    }

    pub fn active_layer(&self) -> LayerId {
        self.project.active_layer
    }

    /// Screen size in points, used for the viewport and paste centre.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    pub fn viewport(&self) -> IRect {
        self.camera.viewport(self.viewport_size)
    }

    /// Composite the visible layers over the viewport, with the floating
    /// buffer drawn on top.
    pub fn render(&mut self) -> ColorImage {
        let viewport = self.viewport();
        let mut image = self.cache.compose(self.project.frame(), viewport).clone();
        if let Some(buffer) = &self.floating {
            buffer.overlay_onto(&mut image, viewport);
        }
        image
    }

    fn commit(&mut self, deltas: &[PixelDelta]) {
        if deltas.is_empty() {
            return;
        }
        self.cache.apply_deltas(deltas);
        let mut touched: Vec<(LayerId, IRect, usize)> = Vec::new();
        for d in deltas {
            let cell = IRect::cell(d.x, d.y);
            match touched.iter_mut().find(|(layer, _, _)| *layer == d.layer) {
                Some((_, area, count)) => {
                    *area = area.union(&cell);
                    *count += 1;
                }
                None => touched.push((d.layer, cell, 1)),
            }
        }
        for (layer, area, count) in touched {
            self.events
                .publish(EditorEvent::PixelsChanged { layer, area, count });
        }
    }

    fn record(&mut self, frame: usize, command: EditCommand) {
        self.history.push(frame, command);
    }

    /// Edits and frame switches wait for the open pointer session to end.
    fn idle(&self, action: &str) -> bool {
        if self.interaction.is_some() {
            log::warn!("{action} ignored: an interaction is in progress");
            return false;
        }
        true
    }

    /// Apply writes as one undoable edit. Returns how many took effect.
    pub fn apply_writes<I>(&mut self, writes: I) -> usize
    where
        I: IntoIterator<Item = PixelWrite>,
    {
        if !self.idle("write") {
            return 0;
        }
        let deltas = self.project.set_pixel_batch(writes);
        self.commit(&deltas);
        let count = deltas.len();
        self.record(self.project.active_frame, EditCommand::Pixels { deltas });
        count
    }

    /// Bucket fill with the current color on the active layer.
    pub fn fill(&mut self, seed: Coord, smart: bool, diagonal: bool) -> usize {
        if !self.idle("fill") {
            return 0;
        }
        let options = FillOptions {
            diagonal,
            smart,
            padding: self.settings.fill_padding,
            gap_close: self.settings.gap_close,
        };
        let plan = FloodFill::new(options).fill(
            self.project.frame(),
            self.project.active_layer,
            seed,
            self.color,
        );
        self.apply_writes(plan.writes)
    }

    /// Replace the selection with the region grown from `seed`.
    pub fn select(&mut self, seed: Coord, mode: SelectMode, diagonal: bool) -> usize {
        let select = ContiguousSelect::new(SelectOptions {
            mode,
            diagonal,
            max_cells: self.settings.select_limit,
        });
        self.selection = self
            .project
            .layer(self.project.active_layer)
            .and_then(|layer| select.run(layer, seed));
        let cells = self.selection.as_ref().map_or(0, Selection::len);
        self.events.publish(EditorEvent::SelectionChanged { cells });
        cells
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.events
                .publish(EditorEvent::SelectionChanged { cells: 0 });
        }
    }

    /// Colored pixels under the selection on the active layer.
    pub fn copy_selection(&self) -> Vec<(i32, i32, Color)> {
        let Some(selection) = &self.selection else {
            return Vec::new();
        };
        selection
            .cells()
            .iter()
            .filter_map(|&(x, y)| {
                self.project
                    .get_pixel(self.project.active_layer, x, y)
                    .map(|c| (x, y, c))
            })
            .collect()
    }

    /// Lift the selected pixels of the active layer into a floating buffer.
    pub fn lift_selection(&mut self) -> bool {
        if self.floating.is_some() || !self.idle("lift") {
            return false;
        }
        let Some(selection) = &self.selection else {
            return false;
        };
        let layer = self.project.active_layer;
        let Some(lifted) = FloatingBuffer::lift(&mut self.project, layer, selection.cells()) else {
            return false;
        };
        self.commit(&lifted.deltas);
        self.record(
            self.project.active_frame,
            EditCommand::Lift {
                deltas: lifted.deltas,
                buffer: lifted.buffer.clone(),
            },
        );
        self.floating = Some(lifted.buffer);
        self.floating_recorded = true;
        self.selection = None;
        self.events
            .publish(EditorEvent::SelectionChanged { cells: 0 });
        self.events
            .publish(EditorEvent::FloatingChanged { active: true });
        true
    }

    /// Float `pixels` centred on `at`, or on the view centre. An existing
    /// buffer is anchored first.
    pub fn paste<I>(&mut self, pixels: I, at: Option<Coord>) -> bool
    where
        I: IntoIterator<Item = (i32, i32, Color)>,
    {
        if !self.idle("paste") || (self.floating.is_some() && !self.anchor()) {
            return false;
        }
        let center = at.unwrap_or_else(|| self.camera.center(self.viewport_size));
        let Some(buffer) = FloatingBuffer::paste(pixels, center) else {
            return false;
        };
        log::debug!("pasted {} pixels at {:?}", buffer.len(), buffer.anchor());
        self.floating = Some(buffer);
        self.floating_recorded = false;
        self.events
            .publish(EditorEvent::FloatingChanged { active: true });
        true
    }

    pub fn transform_floating(&mut self, op: FloatTransform) -> bool {
        let Some(buffer) = self.floating.as_mut() else {
            return false;
        };
        buffer.transform(op);
        self.events
            .publish(EditorEvent::FloatingChanged { active: true });
        true
    }

    /// Stamp the floating buffer onto the active layer.
    ///
    /// A locked, hidden or missing layer refuses the stamp and the buffer
    /// stays floating.
    pub fn anchor(&mut self) -> bool {
        if !self.idle("anchor") {
            return false;
        }
        let Some(buffer) = &self.floating else {
            return false;
        };
        let layer = self.project.active_layer;
        let Some(anchored) = buffer.anchor_to(&mut self.project, layer) else {
            log::warn!("cannot anchor onto layer {:?}: locked, hidden or missing", layer);
            return false;
        };
        let Some(buffer) = self.floating.take() else {
            return false;
        };
        self.commit(&anchored.deltas);
        self.record(
            self.project.active_frame,
            EditCommand::Anchor {
                deltas: anchored.deltas,
                buffer,
            },
        );
        self.events
            .publish(EditorEvent::FloatingChanged { active: false });
        true
    }

    pub fn undo(&mut self) -> bool {
        self.replay(true)
    }

    pub fn redo(&mut self) -> bool {
        self.replay(false)
    }

    /// Undo or redo one entry.
    ///
    /// Refused while a pasted buffer floats: it has no history entry, so a
    /// replay that clears or replaces the floating buffer would lose it.
    fn replay(&mut self, undo: bool) -> bool {
        if !self.idle("history replay") {
            return false;
        }
        if self.floating.is_some() && !self.floating_recorded {
            log::warn!("history replay ignored: anchor the pasted buffer first");
            return false;
        }
        let frame_before = self.project.active_frame;
        let replay = if undo {
            self.history.undo(&mut self.project)
        } else {
            self.history.redo(&mut self.project)
        };
        let Some(replay) = replay else {
            return false;
        };
        if replay.frame != frame_before {
            self.cache.clear();
            self.events.publish(EditorEvent::FrameChanged(replay.frame));
        }
        self.commit(&replay.deltas);
        match replay.floating {
            FloatingChange::Unchanged => {}
            FloatingChange::Clear => {
                self.floating = None;
                self.events
                    .publish(EditorEvent::FloatingChanged { active: false });
            }
            FloatingChange::Restore(buffer) => {
                self.floating = Some(buffer);
                self.floating_recorded = true;
                self.events
                    .publish(EditorEvent::FloatingChanged { active: true });
            }
        }
        self.events.publish(EditorEvent::HistoryReplayed { undo });
        true
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = self.project.add_layer(name);
        self.cache.invalidate();
        self.events.publish(EditorEvent::LayerAdded(id));
        id
    }

    /// The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        if !self.idle("layer removal") || self.project.remove_layer(id).is_none() {
            return false;
        }
        self.cache.drop_layer(id);
        self.events.publish(EditorEvent::LayerRemoved(id));
        true
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.project.layer(id).is_none() {
            return false;
        }
        self.project.active_layer = id;
        self.events.publish(EditorEvent::LayerChanged(id));
        true
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        let changed = self.project.set_layer_visible(id, visible);
        self.after_layer_change(id, changed)
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> bool {
        let changed = self.project.set_layer_locked(id, locked);
        self.after_layer_change(id, changed)
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: u8) -> bool {
        let changed = self.project.set_layer_opacity(id, opacity);
        self.after_layer_change(id, changed)
    }

    fn after_layer_change(&mut self, id: LayerId, changed: bool) -> bool {
        if changed {
            self.cache.invalidate();
            self.events.publish(EditorEvent::LayerChanged(id));
        }
        changed
    }

    pub fn add_frame(&mut self) -> usize {
        self.project.add_frame()
    }

    /// Switch frames, discarding every cached chunk of the old one.
    ///
    /// Refused during a pointer session, which stays bound to its frame.
    pub fn set_active_frame(&mut self, index: usize) -> bool {
        if index == self.project.active_frame {
            return true;
        }
        if !self.idle("frame switch") || !self.project.set_active_frame(index) {
            return false;
        }
        self.cache.clear();
        log::info!("switched to frame {index}");
        self.events.publish(EditorEvent::FrameChanged(index));
        true
    }

    /// Start a tool interaction at `cell`.
    ///
    /// Bucket and magic wand act immediately. Pen, eraser and move open a
    /// session that lasts until [`Editor::pointer_up`]; a second press while
    /// one is open is rejected.
    pub fn pointer_down(&mut self, cell: Coord) -> bool {
        if !self.idle("pointer down") {
            return false;
        }
        let tool = self.tool;
        let frame = self.project.active_frame;
        let layer = self.project.active_layer;
        match tool {
            Tool::Pen | Tool::Eraser => {
                let deltas = self.stroke_to(tool, layer, None, cell);
                self.interaction = Some(Interaction {
                    tool,
                    frame,
                    layer,
                    last: cell,
                    deltas,
                });
                true
            }
            Tool::Bucket { smart, diagonal } => self.fill(cell, smart, diagonal) > 0,
            Tool::MagicWand { mode, diagonal } => self.select(cell, mode, diagonal) > 0,
            Tool::Move => {
                if self.floating.is_none() && !self.lift_selection() {
                    return false;
                }
                self.interaction = Some(Interaction {
                    tool,
                    frame,
                    layer,
                    last: cell,
                    deltas: Vec::new(),
                });
                true
            }
        }
    }

    pub fn pointer_move(&mut self, cell: Coord) -> bool {
        let Some(mut session) = self.interaction.take() else {
            return false;
        };
        let moved = session.last != cell;
        if moved {
            match session.tool {
                Tool::Pen | Tool::Eraser => {
                    let deltas = self.stroke_to(session.tool, session.layer, Some(session.last), cell);
                    session.deltas.extend(deltas);
                }
                Tool::Move => {
                    let (dx, dy) = (cell.0 - session.last.0, cell.1 - session.last.1);
                    self.transform_floating(FloatTransform::Translate { dx, dy });
                }
                Tool::Bucket { .. } | Tool::MagicWand { .. } => {}
            }
            session.last = cell;
        }
        self.interaction = Some(session);
        moved
    }

    /// Close the open session; a stroke becomes one history entry.
    pub fn pointer_up(&mut self) -> bool {
        let Some(session) = self.interaction.take() else {
            return false;
        };
        if matches!(session.tool, Tool::Pen | Tool::Eraser) {
            self.record(session.frame, EditCommand::Pixels { deltas: session.deltas });
        }
        true
    }

    fn stroke_to(&mut self, tool: Tool, layer: LayerId, from: Option<Coord>, to: Coord) -> Vec<PixelDelta> {
        let color = match tool {
            Tool::Eraser => None,
            _ => Some(self.color),
        };
        let cells = match from {
            Some(from) => line_cells(from, to).into_iter().skip(1).collect(),
            None => vec![to],
        };
        let deltas = self.project.set_pixel_batch(
            cells
                .into_iter()
                .map(|(x, y)| PixelWrite { layer, x, y, color }),
        );
        self.commit(&deltas);
        deltas
    }

    /// Write the visible layers, cropped to their content, to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let frame = self.project.frame();
        let bounds = frame.visible_content_bounds().ok_or(ExportError::Empty)?;
        save_color_image(&render_direct(frame, bounds), path, format)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Project::new("Untitled"), EngineSettings::default())
    }
}
