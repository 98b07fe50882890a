use wf_project::{
    new_row_id, validate::validate_washing_component, DocumentStore, WashingComponentEntry,
    WashingComponentRow,
};

use super::{Page, PageId};
use crate::error::{AppError, AppResult};

/// Table of washing components (nozzle targets).
#[derive(Debug, Default)]
pub struct WashingComponentsPage {
    pub rows: Vec<WashingComponentRow>,
}

impl WashingComponentsPage {
    /// Append a row for a catalog entry; returns its fresh id.
    pub fn add_from_catalog(&mut self, entry: &WashingComponentEntry) -> String {
        let mut row = WashingComponentRow::new(new_row_id(), entry.name.clone());
        row.nozzle_ref = entry.nozzle_ref.clone();
        let id = row.id.clone();
        self.rows.push(row);
        id
    }

    pub fn add_row(&mut self, name: &str) -> AppResult<String> {
        let name = wf_core::require_text(name, "Component")?;
        let row = WashingComponentRow::new(new_row_id(), name);
        let id = row.id.clone();
        self.rows.push(row);
        Ok(id)
    }

    pub fn remove_row(&mut self, index: usize) -> AppResult<WashingComponentRow> {
        if index >= self.rows.len() {
            return Err(AppError::InvalidState(format!(
                "washing component row {index} out of range"
            )));
        }
        Ok(self.rows.remove(index))
    }

    pub fn problems(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| validate_washing_component(r).err())
            .map(|e| e.to_string())
            .collect()
    }
}

impl Page for WashingComponentsPage {
    fn id(&self) -> PageId {
        PageId::WashingComponents
    }

    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()> {
        store.set_washing_components(self.rows.clone());
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        self.rows = store.washing_components().to_vec();
        Ok(())
    }

    fn is_completed(&self) -> bool {
        !self.rows.is_empty() && self.problems().is_empty()
    }
}
