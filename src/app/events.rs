//! Typed publish/subscribe for editor notifications.

use std::collections::HashMap;

use crate::canvas::project::LayerId;
use crate::utils::geometry::IRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Pixels,
    Layers,
    Frame,
    Floating,
    Selection,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Pixels changed on `layer`; `area` bounds every touched cell.
    PixelsChanged {
        layer: LayerId,
        area: IRect,
        count: usize,
    },
    LayerAdded(LayerId),
    LayerRemoved(LayerId),
    LayerChanged(LayerId),
    FrameChanged(usize),
    FloatingChanged { active: bool },
    SelectionChanged { cells: usize },
    HistoryReplayed { undo: bool },
}

impl EditorEvent {
    pub fn topic(&self) -> Topic {
        match self {
            EditorEvent::PixelsChanged { .. } => Topic::Pixels,
            EditorEvent::LayerAdded(_)
            | EditorEvent::LayerRemoved(_)
            | EditorEvent::LayerChanged(_) => Topic::Layers,
            EditorEvent::FrameChanged(_) => Topic::Frame,
            EditorEvent::FloatingChanged { .. } => Topic::Floating,
            EditorEvent::SelectionChanged { .. } => Topic::Selection,
            EditorEvent::HistoryReplayed { .. } => Topic::History,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&EditorEvent)>;

/// Handlers run synchronously, in subscription order, on the publishing thread.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        topic: Topic,
        handler: impl FnMut(&EditorEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(topic)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn publish(&mut self, event: EditorEvent) {
        if let Some(list) = self.handlers.get_mut(&event.topic()) {
            for (_, handler) in list.iter_mut() {
                handler(&event);
            }
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }
}
