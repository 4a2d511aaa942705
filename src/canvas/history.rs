use std::collections::VecDeque;

use crate::canvas::pixel_store::PixelDelta;
use crate::canvas::project::Project;
use crate::selection::floating::FloatingBuffer;

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// One user-visible edit, stored as the pixel deltas it committed.
#[derive(Debug, Clone)]
pub enum EditCommand {
    /// Strokes, fills, erasures.
    Pixels { deltas: Vec<PixelDelta> },
    /// Pixels erased from a layer into `buffer`.
    Lift {
        deltas: Vec<PixelDelta>,
        buffer: FloatingBuffer,
    },
    /// `buffer` stamped onto a layer.
    Anchor {
        deltas: Vec<PixelDelta>,
        buffer: FloatingBuffer,
    },
}

impl EditCommand {
    pub fn deltas(&self) -> &[PixelDelta] {
        match self {
            EditCommand::Pixels { deltas }
            | EditCommand::Lift { deltas, .. }
            | EditCommand::Anchor { deltas, .. } => deltas,
        }
    }
}

/// What replaying an entry means for the floating buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatingChange {
    Unchanged,
    Clear,
    Restore(FloatingBuffer),
}

/// Outcome of an undo or redo, for the caller to patch caches and overlays.
#[derive(Debug, Clone)]
pub struct Replay {
    pub frame: usize,
    pub deltas: Vec<PixelDelta>,
    pub floating: FloatingChange,
}

#[derive(Debug, Clone)]
struct Entry {
    frame: usize,
    command: EditCommand,
}

/// Bounded undo/redo stacks of edit commands.
pub struct History {
    undo_stack: VecDeque<Entry>,
    redo_stack: Vec<Entry>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record a command committed on `frame` and clear redo. Empty pixel
    /// commands are ignored.
    pub fn push(&mut self, frame: usize, command: EditCommand) {
        if let EditCommand::Pixels { deltas } = &command {
            if deltas.is_empty() {
                return;
            }
        }
        self.undo_stack.push_back(Entry { frame, command });
        self.redo_stack.clear();
        while self.undo_stack.len() > self.depth {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Revert the latest command, switching to the frame it was made on.
    pub fn undo(&mut self, project: &mut Project) -> Option<Replay> {
        let entry = self.undo_stack.pop_back()?;
        project.set_active_frame(entry.frame);
        let deltas = entry
            .command
            .deltas()
            .iter()
            .rev()
            .filter_map(|d| project.restore_pixel(d.layer, d.x, d.y, d.old))
            .collect();
        let floating = match &entry.command {
            EditCommand::Pixels { .. } => FloatingChange::Unchanged,
            EditCommand::Lift { .. } => FloatingChange::Clear,
            EditCommand::Anchor { buffer, .. } => FloatingChange::Restore(buffer.clone()),
        };
        let frame = entry.frame;
        self.redo_stack.push(entry);
        log::debug!("undo on frame {frame}");
        Some(Replay {
            frame,
            deltas,
            floating,
        })
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, project: &mut Project) -> Option<Replay> {
        let entry = self.redo_stack.pop()?;
        project.set_active_frame(entry.frame);
        let deltas = entry
            .command
            .deltas()
            .iter()
            .filter_map(|d| project.restore_pixel(d.layer, d.x, d.y, d.new))
            .collect();
        let floating = match &entry.command {
            EditCommand::Pixels { .. } => FloatingChange::Unchanged,
            EditCommand::Lift { buffer, .. } => FloatingChange::Restore(buffer.clone()),
            EditCommand::Anchor { .. } => FloatingChange::Clear,
        };
        let frame = entry.frame;
        self.undo_stack.push_back(entry);
        log::debug!("redo on frame {frame}");
        Some(Replay {
            frame,
            deltas,
            floating,
        })
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}
