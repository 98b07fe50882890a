use tracing::debug;
use wf_graph::PumpInterpretation;
use wf_project::{DocumentStore, SequencesSection};
use wf_sequence::{layout, DurationUnit, Priority, PriorityConflict, SequenceTable, Timeline};

use super::{Page, PageId};
use crate::circuit_io::summary_to_interpretation;
use crate::error::AppResult;
use crate::sequence_io::{rows_from_section, section_from_rows};

/// Activation rows and their timeline.
#[derive(Debug, Default)]
pub struct SequencePage {
    table: SequenceTable,
    timeline: Timeline,
    previous: SequencesSection,
}

impl SequencePage {
    pub fn table(&self) -> &SequenceTable {
        &self.table
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn conflicts(&self) -> Vec<PriorityConflict> {
        self.table.priority_conflicts()
    }

    /// Regenerate rows from circuit summaries, keeping entered values.
    pub fn rebuild(&mut self, interpretations: &[PumpInterpretation]) {
        self.table.rebuild(interpretations);
        self.relayout();
    }

    pub fn set_priority(&mut self, row: usize, priority: Priority) -> AppResult<usize> {
        let changed = self.table.set_priority(row, priority)?;
        self.relayout();
        Ok(changed)
    }

    /// Validate and store a typed duration. The previous value is kept on error.
    pub fn enter_duration(&mut self, row: usize, text: &str) -> AppResult<f64> {
        let value = self.table.enter_duration(row, text)?;
        self.relayout();
        Ok(value)
    }

    /// Store text as typed, without validation (live editing).
    pub fn set_duration_text(&mut self, row: usize, text: &str) -> AppResult<()> {
        self.table.set_duration(row, text)?;
        self.relayout();
        Ok(())
    }

    pub fn set_unit(&mut self, row: usize, unit: DurationUnit) -> AppResult<()> {
        self.table.set_unit(row, unit)?;
        self.relayout();
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> AppResult<()> {
        self.table.remove_row(row)?;
        self.relayout();
        Ok(())
    }

    fn relayout(&mut self) {
        self.timeline = layout(self.table.rows());
    }
}

impl Page for SequencePage {
    fn id(&self) -> PageId {
        PageId::Sequence
    }

    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()> {
        store.set_sequences(section_from_rows(self.table.rows(), &self.previous));
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        self.previous = store.sequences().clone();
        self.table = SequenceTable::from_rows(rows_from_section(&self.previous));
        let interpretations: Vec<PumpInterpretation> = store
            .circuits()
            .connection_summary
            .iter()
            .map(summary_to_interpretation)
            .collect();
        self.rebuild(&interpretations);
        debug!(rows = self.table.len(), "sequence page refreshed");
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.table.is_complete() && self.conflicts().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wf_project::{CircuitsSection, PumpSummaryDef, SummaryEntryDef};

    fn entry(id: &str) -> SummaryEntryDef {
        SummaryEntryDef {
            id: id.into(),
            name: id.to_uppercase(),
            kind: "component".into(),
        }
    }

    fn store_with_two_outputs() -> DocumentStore {
        let mut store = DocumentStore::new();
        let mut outputs = BTreeMap::new();
        outputs.insert("1".to_string(), vec![entry("a")]);
        outputs.insert("2".to_string(), vec![entry("b")]);
        store.set_circuits(CircuitsSection {
            connection_summary: vec![PumpSummaryDef {
                pump_index: 0,
                pump_id: "p".into(),
                pump_name: "P".into(),
                outputs,
            }],
            ..Default::default()
        });
        store
    }

    #[test]
    fn rows_come_from_the_summary_and_survive_a_round_trip() {
        let mut store = store_with_two_outputs();
        let mut page = SequencePage::default();
        page.refresh_configuration(&store).unwrap();
        assert_eq!(page.table().len(), 2);
        assert!(!page.is_completed());

        page.enter_duration(0, "5").unwrap();
        page.enter_duration(1, "3").unwrap();
        page.set_priority(0, Priority::Primary).unwrap();
        assert!(page.is_completed());
        assert_eq!(page.timeline().total_duration_s, 8.0);

        page.on_leave_page(&mut store).unwrap();
        assert_eq!(store.sequences().sequence_configuration.total_tasks, 2);
        assert_eq!(store.sequences().sequence_configuration.total_duration_seconds, 8.0);

        let mut again = SequencePage::default();
        again.refresh_configuration(&store).unwrap();
        assert_eq!(again.table().rows(), page.table().rows());
    }

    #[test]
    fn same_priority_on_both_outputs_is_a_conflict() {
        let store = store_with_two_outputs();
        let mut page = SequencePage::default();
        page.refresh_configuration(&store).unwrap();
        page.enter_duration(0, "1").unwrap();
        page.enter_duration(1, "1").unwrap();
        assert_eq!(page.conflicts().len(), 1);
        assert!(!page.is_completed());
    }

    #[test]
    fn bad_duration_keeps_the_previous_value() {
        let store = store_with_two_outputs();
        let mut page = SequencePage::default();
        page.refresh_configuration(&store).unwrap();
        page.enter_duration(0, "2").unwrap();
        assert!(page.enter_duration(0, "abc").is_err());
        assert_eq!(page.table().rows()[0].duration, "2");
    }
}
