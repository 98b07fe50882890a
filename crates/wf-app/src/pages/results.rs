use wf_project::{validate_document, DocumentStore};

use super::{Page, PageId};
use crate::error::AppResult;

/// Counts shown on the results page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsSummary {
    pub washing_components: usize,
    pub pumps: usize,
    pub circuits: usize,
    pub reached_components: usize,
    pub tasks: usize,
    pub total_duration_s: f64,
    /// First document validation error, if any.
    pub problem: Option<String>,
}

#[derive(Debug, Default)]
pub struct ResultsPage {
    summary: ResultsSummary,
}

impl ResultsPage {
    pub fn summary(&self) -> &ResultsSummary {
        &self.summary
    }
}

impl Page for ResultsPage {
    fn id(&self) -> PageId {
        PageId::Results
    }

    fn on_leave_page(&mut self, _store: &mut DocumentStore) -> AppResult<()> {
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        let config = store.config();
        let sequences = &config.sequences.sequence_configuration;
        self.summary = ResultsSummary {
            washing_components: config.washing_components.len(),
            pumps: config.pumps.len(),
            circuits: config.circuits.circuits.len(),
            reached_components: config
                .circuits
                .connection_summary
                .iter()
                .flat_map(|s| s.outputs.values())
                .map(Vec::len)
                .sum(),
            tasks: sequences.total_tasks,
            total_duration_s: sequences.total_duration_seconds,
            problem: validate_document(config).err().map(|e| e.to_string()),
        };
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.summary.problem.is_none() && self.summary.tasks > 0
    }
}
