use tracing::info;
use wf_project::{new_row_id, validate::validate_pump, DocumentStore, OutputCount, PumpRow};

use super::{Page, PageId};
use crate::error::{AppError, AppResult};
use crate::sequence_io::{rows_from_section, section_from_rows};

#[derive(Debug, Default)]
pub struct PumpsPage {
    pub rows: Vec<PumpRow>,
}

impl PumpsPage {
    pub fn add_pump(&mut self, category: &str, name: &str, outputs: u32) -> AppResult<String> {
        let name = wf_core::require_text(name, "Pump Name")?;
        let outputs = OutputCount::from_count(outputs).ok_or_else(|| AppError::InputValidation {
            field: "Number of output".to_string(),
            reason: "must be 1 or 2".to_string(),
        })?;
        let mut row = PumpRow::new(new_row_id(), name, outputs);
        row.category = category.trim().to_string();
        let id = row.id.clone();
        self.rows.push(row);
        Ok(id)
    }

    pub fn remove_pump(&mut self, index: usize) -> AppResult<PumpRow> {
        if index >= self.rows.len() {
            return Err(AppError::InvalidState(format!("pump row {index} out of range")));
        }
        Ok(self.rows.remove(index))
    }

    pub fn problems(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| validate_pump(r).err())
            .map(|e| e.to_string())
            .collect()
    }
}

impl Page for PumpsPage {
    fn id(&self) -> PageId {
        PageId::Pumps
    }

    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()> {
        let moves = index_moves(store.pumps(), &self.rows);
        if moves.iter().enumerate().any(|(old, new)| *new != Some(old)) {
            reindex_pump_sections(store, &moves);
        }
        store.set_pumps(self.rows.clone());
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        self.rows = store.pumps().to_vec();
        Ok(())
    }

    fn is_completed(&self) -> bool {
        !self.rows.is_empty() && self.problems().is_empty()
    }
}

/// New position of each previously stored pump, matched by row id.
fn index_moves(before: &[PumpRow], after: &[PumpRow]) -> Vec<Option<usize>> {
    before
        .iter()
        .map(|old| after.iter().position(|new| new.id == old.id))
        .collect()
}

/// Carry circuits, connection summaries and tasks over to the new pump
/// order; entries of removed pumps are dropped.
fn reindex_pump_sections(store: &mut DocumentStore, moves: &[Option<usize>]) {
    let target = |index: usize| moves.get(index).copied().flatten();

    let mut circuits = store.circuits().clone();
    circuits.circuits.retain_mut(|c| match target(c.pump_index) {
        Some(new) => {
            c.pump_index = new;
            true
        }
        None => false,
    });
    circuits.connection_summary.retain_mut(|s| match target(s.pump_index) {
        Some(new) => {
            s.pump_index = new;
            true
        }
        None => false,
    });
    circuits.circuits.sort_by_key(|c| c.pump_index);
    circuits.connection_summary.sort_by_key(|s| s.pump_index);

    let mut rows = rows_from_section(store.sequences());
    rows.retain_mut(|r| match target(r.pump_index) {
        Some(new) => {
            r.pump_index = new;
            true
        }
        None => false,
    });
    let sequences = section_from_rows(&rows, store.sequences());

    info!(
        circuits = circuits.circuits.len(),
        tasks = rows.len(),
        "pump order changed, document sections reindexed"
    );
    store.set_circuits(circuits);
    store.set_sequences(sequences);
}
