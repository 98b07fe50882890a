use std::time::Instant;

use tracing::{debug, info};
use wf_graph::{InterpretationIssue, PumpInterpretation};
use wf_project::{CircuitsSection, DocumentStore, PumpCircuitDef, WashingComponentRow};
use wf_sequence::SequenceTable;

use super::{Page, PageId};
use crate::circuit_io::interpretation_to_summary;
use crate::sequence_io::{rows_from_section, section_from_rows};
use crate::editor::{CanvasEditor, Notice};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::settings::AppSettings;

/// One canvas editor per pump plus the live synthesis view.
pub struct CircuitsPage {
    settings: AppSettings,
    editors: Vec<CanvasEditor>,
    bus: EventBus,
    components: Vec<WashingComponentRow>,
    interpretations: Vec<PumpInterpretation>,
    fingerprints: Vec<String>,
    last_check: Option<Instant>,
    notices: Vec<Notice>,
    section_extra: wf_project::Extra,
}

impl CircuitsPage {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            editors: Vec::new(),
            bus: EventBus::new(),
            components: Vec::new(),
            interpretations: Vec::new(),
            fingerprints: Vec::new(),
            last_check: None,
            notices: Vec::new(),
            section_extra: Default::default(),
        }
    }

    pub fn editors(&self) -> &[CanvasEditor] {
        &self.editors
    }

    /// An editor together with the shared bus its mutations report to.
    pub fn editor_and_bus(&mut self, pump_index: usize) -> Option<(&mut CanvasEditor, &mut EventBus)> {
        let editor = self.editors.get_mut(pump_index)?;
        Some((editor, &mut self.bus))
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn components(&self) -> &[WashingComponentRow] {
        &self.components
    }

    /// Components not placed on any canvas, in document order.
    pub fn available_components(&self) -> Vec<&WashingComponentRow> {
        self.bus.availability.available(&self.components)
    }

    pub fn interpretations(&self) -> &[PumpInterpretation] {
        &self.interpretations
    }

    /// Problems that keep the page from completing.
    pub fn issues(&self) -> Vec<String> {
        let mut out = Vec::new();
        for interp in &self.interpretations {
            if interp.component_count() == 0 {
                out.push(format!("{}: no washing component reached", interp.pump_name));
            }
            for issue in &interp.issues {
                if matches!(issue, InterpretationIssue::DuplicateIdentity { .. }) {
                    out.push(format!("{}: {issue}", interp.pump_name));
                }
            }
        }
        out
    }

    /// Recompute the synthesis for circuits flagged on the bus, or, once the
    /// period has elapsed, for circuits whose fingerprint moved.
    /// Returns whether anything was recomputed.
    pub fn poll_synthesis(&mut self, now: Instant) -> bool {
        let mut stale: Vec<usize> = self.bus.take_dirty().into_iter().collect();
        let due = self
            .last_check
            .map_or(true, |t| now.duration_since(t) >= self.settings.synthesis_period());
        if due {
            self.last_check = Some(now);
            for (i, editor) in self.editors.iter().enumerate() {
                if self.fingerprints.get(i) != Some(&editor.fingerprint()) && !stale.contains(&i) {
                    stale.push(i);
                }
            }
        }
        stale.retain(|i| *i < self.editors.len());
        for &i in &stale {
            self.synthesize(i);
        }
        !stale.is_empty()
    }

    fn synthesize(&mut self, i: usize) {
        let Some(editor) = self.editors.get(i) else {
            return;
        };
        let interp = editor.interpret(&self.components);
        let print = editor.fingerprint();
        debug!(pump_index = i, components = interp.component_count(), "circuit synthesized");
        self.interpretations[i] = interp;
        self.fingerprints[i] = print;
    }

    fn synthesize_all(&mut self) {
        self.interpretations = self
            .editors
            .iter()
            .map(|e| e.interpret(&self.components))
            .collect();
        self.fingerprints = self.editors.iter().map(|e| e.fingerprint()).collect();
        self.bus.take_dirty();
    }

    /// Collect notices from every editor and from restores.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut out = std::mem::take(&mut self.notices);
        for editor in &mut self.editors {
            out.extend(editor.drain_notices());
        }
        out
    }

    /// Drop every editor, releasing placed components.
    pub fn clear(&mut self) {
        for editor in &mut self.editors {
            editor.release_all(&mut self.bus);
        }
        self.editors.clear();
        self.interpretations.clear();
        self.fingerprints.clear();
        self.components.clear();
        self.notices.clear();
        self.bus.clear();
        self.last_check = None;
    }
}

impl Page for CircuitsPage {
    fn id(&self) -> PageId {
        PageId::Circuits
    }

    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()> {
        self.synthesize_all();
        let section = CircuitsSection {
            circuits: self
                .editors
                .iter()
                .map(|e| PumpCircuitDef {
                    pump_index: e.pump_index(),
                    circuit: e.to_def(),
                })
                .collect(),
            connection_summary: self
                .interpretations
                .iter()
                .map(interpretation_to_summary)
                .collect(),
            extra: self.section_extra.clone(),
        };
        store.set_circuits(section);

        // Tasks follow the circuits they were generated from.
        let mut table = SequenceTable::from_rows(rows_from_section(store.sequences()));
        table.rebuild(&self.interpretations);
        let sequences = section_from_rows(table.rows(), store.sequences());
        store.set_sequences(sequences);
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        self.clear();
        self.components = store.washing_components().to_vec();
        self.section_extra = store.circuits().extra.clone();
        for (i, pump) in store.pumps().iter().enumerate() {
            let mut editor = CanvasEditor::new(i, pump, &self.settings, &mut self.bus)?;
            if let Some(def) = store.circuits().circuit_for(i) {
                let report = editor.restore(def, &self.components, &mut self.bus);
                if !report.is_clean() {
                    info!(pump_index = i, issues = report.issues.len(), "circuit restored with issues");
                }
            }
            self.editors.push(editor);
        }
        self.synthesize_all();
        Ok(())
    }

    fn is_completed(&self) -> bool {
        !self.editors.is_empty() && self.issues().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wf_core::Point;
    use wf_project::{Catalog, OutputCount, PumpRow};

    use crate::editor::PointerOutcome;

    fn store() -> DocumentStore {
        let mut store = DocumentStore::new();
        store.set_washing_components(vec![
            WashingComponentRow::new("a", "A"),
            WashingComponentRow::new("b", "B"),
        ]);
        store.set_pumps(vec![
            PumpRow::new("p1", "WP-1", OutputCount::One),
            PumpRow::new("p2", "WP-2", OutputCount::One),
        ]);
        store
    }

    fn place_and_connect(page: &mut CircuitsPage, pump: usize, id: &str, at: Point) {
        let cat = Catalog::fallback();
        let rows = page.components().to_vec();
        let (ed, bus) = page.editor_and_bus(pump).unwrap();
        ed.select_component(id, &rows, bus).unwrap();
        assert!(matches!(ed.pointer_press(at, bus, &cat), PointerOutcome::Placed(_)));
        ed.set_mode(crate::editor::EditorMode::Connect);
        let p = ed.circuit().pump().unwrap().position;
        ed.pointer_press(p, bus, &cat);
        ed.pointer_press(at, bus, &cat);
        ed.dialog_mut().unwrap().form.length = "100".into();
        ed.confirm_dialog(bus).unwrap();
    }

    #[test]
    fn one_editor_per_pump_and_shared_availability() {
        let store = store();
        let mut page = CircuitsPage::new(AppSettings::default());
        page.refresh_configuration(&store).unwrap();
        assert_eq!(page.editors().len(), 2);
        assert!(!page.is_completed());

        place_and_connect(&mut page, 0, "a", Point::new(500.0, 200.0));
        let left: Vec<_> = page.available_components().iter().map(|r| r.id.clone()).collect();
        assert_eq!(left, vec!["b".to_string()]);

        let rows = page.components().to_vec();
        let (ed, bus) = page.editor_and_bus(1).unwrap();
        assert!(ed.select_component("a", &rows, bus).is_err());
    }

    #[test]
    fn dirty_bus_triggers_synthesis() {
        let store = store();
        let mut page = CircuitsPage::new(AppSettings::default());
        page.refresh_configuration(&store).unwrap();
        let t0 = Instant::now();
        page.poll_synthesis(t0);

        place_and_connect(&mut page, 0, "a", Point::new(500.0, 200.0));
        assert!(page.poll_synthesis(t0 + Duration::from_millis(10)));
        assert_eq!(page.interpretations()[0].component_count(), 1);
        assert!(!page.poll_synthesis(t0 + Duration::from_millis(20)));

        place_and_connect(&mut page, 1, "b", Point::new(500.0, 200.0));
        page.poll_synthesis(t0 + Duration::from_secs(5));
        assert!(page.is_completed());
    }

    #[test]
    fn leave_then_refresh_restores_circuits() {
        let mut store = store();
        let mut page = CircuitsPage::new(AppSettings::default());
        page.refresh_configuration(&store).unwrap();
        place_and_connect(&mut page, 0, "a", Point::new(500.0, 200.0));
        place_and_connect(&mut page, 1, "b", Point::new(600.0, 300.0));
        page.on_leave_page(&mut store).unwrap();
        let summary = store.circuits().connection_summary.clone();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[1].outputs["1"][0].id, "b");

        page.refresh_configuration(&store).unwrap();
        assert!(page.is_completed());
        assert!(page.bus().availability.is_placed("a"));
        let again: Vec<_> = page.interpretations().iter().map(interpretation_to_summary).collect();
        assert_eq!(again, summary);
    }
}
