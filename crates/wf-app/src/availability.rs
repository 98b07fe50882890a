//! Which washing components are already placed on some pump's canvas.

use std::collections::BTreeMap;

use wf_project::WashingComponentRow;

/// Counted set of placed component identities, shared by every editor of a page.
///
/// Counting lets one identity sit on two canvases transiently (during a
/// restore of an inconsistent document) without a removal on one canvas
/// releasing it on the other.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTracker {
    placed: BTreeMap<String, usize>,
    revision: u64,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_placed(&mut self, component_id: &str) {
        *self.placed.entry(component_id.to_string()).or_insert(0) += 1;
        self.revision += 1;
    }

    pub fn mark_available(&mut self, component_id: &str) {
        if let Some(count) = self.placed.get_mut(component_id) {
            *count -= 1;
            if *count == 0 {
                self.placed.remove(component_id);
            }
            self.revision += 1;
        }
    }

    pub fn is_placed(&self, component_id: &str) -> bool {
        self.placed.contains_key(component_id)
    }

    /// Listed in the document and not placed anywhere.
    pub fn is_available(&self, component_id: &str, rows: &[WashingComponentRow]) -> bool {
        rows.iter().any(|r| r.id == component_id) && !self.is_placed(component_id)
    }

    /// Rows still offered in the palettes, in document order.
    pub fn available<'a>(&self, rows: &'a [WashingComponentRow]) -> Vec<&'a WashingComponentRow> {
        rows.iter().filter(|r| !self.is_placed(&r.id)).collect()
    }

    pub fn placed_ids(&self) -> impl Iterator<Item = &str> {
        self.placed.keys().map(String::as_str)
    }

    /// Bumped on every change; palettes redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        self.placed.clear();
        self.revision += 1;
    }
}
