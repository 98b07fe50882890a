//! Event bus shared by the editors of the circuits page.

use std::collections::BTreeSet;

use tracing::debug;
use wf_graph::{CircuitNode, NodeKind};

use crate::availability::AvailabilityTracker;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    NodePlaced {
        pump_index: usize,
        kind: NodeKind,
        identity: String,
    },
    NodeRemoved {
        pump_index: usize,
        kind: NodeKind,
        identity: String,
    },
    /// Any structural change (pipes, moves, parameters).
    CircuitChanged { pump_index: usize },
}

/// Synchronous bus: availability is updated before the publishing call
/// returns, and the circuit is flagged dirty for the synthesis view.
#[derive(Debug, Default)]
pub struct EventBus {
    pub availability: AvailabilityTracker,
    log: Vec<EditorEvent>,
    dirty: BTreeSet<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: EditorEvent) {
        debug!(?event, "editor event");
        match &event {
            EditorEvent::NodePlaced {
                pump_index,
                kind,
                identity,
            } => {
                if *kind == NodeKind::Component {
                    self.availability.mark_placed(identity);
                }
                self.dirty.insert(*pump_index);
            }
            EditorEvent::NodeRemoved {
                pump_index,
                kind,
                identity,
            } => {
                if *kind == NodeKind::Component {
                    self.availability.mark_available(identity);
                }
                self.dirty.insert(*pump_index);
            }
            EditorEvent::CircuitChanged { pump_index } => {
                self.dirty.insert(*pump_index);
            }
        }
        self.log.push(event);
    }

    pub fn node_placed(&mut self, pump_index: usize, node: &CircuitNode) {
        self.publish(EditorEvent::NodePlaced {
            pump_index,
            kind: node.kind,
            identity: node.identity.clone(),
        });
    }

    pub fn node_removed(&mut self, pump_index: usize, node: &CircuitNode) {
        self.publish(EditorEvent::NodeRemoved {
            pump_index,
            kind: node.kind,
            identity: node.identity.clone(),
        });
    }

    pub fn changed(&mut self, pump_index: usize) {
        self.publish(EditorEvent::CircuitChanged { pump_index });
    }

    /// Events since the last drain, in publish order.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.log)
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Pump indices whose circuit changed since the last call.
    pub fn take_dirty(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.dirty)
    }

    pub fn clear(&mut self) {
        self.availability.clear();
        self.log.clear();
        self.dirty.clear();
    }
}
