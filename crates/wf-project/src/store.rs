//! The single in-memory document shared by every page.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::schema::{
    CircuitsSection, Configuration, DocumentFile, Extra, GeneralSettings, PumpRow,
    SequencesSection, WashingComponentRow,
};
use crate::{load_json, save_json, ProjectResult};

/// The five named document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    GeneralSettings,
    WashingComponents,
    Pumps,
    Circuits,
    Sequences,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::GeneralSettings,
        Section::WashingComponents,
        Section::Pumps,
        Section::Circuits,
        Section::Sequences,
    ];

    /// Key under `configuration` in the persisted file.
    pub fn key(self) -> &'static str {
        match self {
            Section::GeneralSettings => "general_settings",
            Section::WashingComponents => "washing_components",
            Section::Pumps => "pumps",
            Section::Circuits => "circuits",
            Section::Sequences => "sequences",
        }
    }
}

/// Single-writer document store with change notification.
///
/// Every write records the touched section; pages drain the list to learn
/// what to reload.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    config: Configuration,
    file_extra: Extra,
    changes: Vec<Section>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configuration(config: Configuration) -> Self {
        Self {
            config,
            file_extra: Extra::new(),
            changes: Section::ALL.to_vec(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Section as a JSON value.
    pub fn get(&self, section: Section) -> ProjectResult<Value> {
        let value = match section {
            Section::GeneralSettings => serde_json::to_value(&self.config.general_settings)?,
            Section::WashingComponents => serde_json::to_value(&self.config.washing_components)?,
            Section::Pumps => serde_json::to_value(&self.config.pumps)?,
            Section::Circuits => serde_json::to_value(&self.config.circuits)?,
            Section::Sequences => serde_json::to_value(&self.config.sequences)?,
        };
        Ok(value)
    }

    /// Replace a section from a JSON value. The document is untouched on error.
    pub fn set(&mut self, section: Section, value: Value) -> ProjectResult<()> {
        match section {
            Section::GeneralSettings => {
                self.config.general_settings = serde_json::from_value(value)?
            }
            Section::WashingComponents => {
                self.config.washing_components = serde_json::from_value(value)?
            }
            Section::Pumps => self.config.pumps = serde_json::from_value(value)?,
            Section::Circuits => self.config.circuits = serde_json::from_value(value)?,
            Section::Sequences => self.config.sequences = serde_json::from_value(value)?,
        }
        self.touch(section);
        Ok(())
    }

    pub fn general_settings(&self) -> &GeneralSettings {
        &self.config.general_settings
    }

    pub fn set_general_settings(&mut self, settings: GeneralSettings) {
        self.config.general_settings = settings;
        self.touch(Section::GeneralSettings);
    }

    pub fn washing_components(&self) -> &[WashingComponentRow] {
        &self.config.washing_components
    }

    pub fn set_washing_components(&mut self, rows: Vec<WashingComponentRow>) {
        self.config.washing_components = rows;
        self.touch(Section::WashingComponents);
    }

    pub fn pumps(&self) -> &[PumpRow] {
        &self.config.pumps
    }

    pub fn set_pumps(&mut self, rows: Vec<PumpRow>) {
        self.config.pumps = rows;
        self.touch(Section::Pumps);
    }

    pub fn circuits(&self) -> &CircuitsSection {
        &self.config.circuits
    }

    pub fn set_circuits(&mut self, circuits: CircuitsSection) {
        self.config.circuits = circuits;
        self.touch(Section::Circuits);
    }

    pub fn sequences(&self) -> &SequencesSection {
        &self.config.sequences
    }

    pub fn set_sequences(&mut self, sequences: SequencesSection) {
        self.config.sequences = sequences;
        self.touch(Section::Sequences);
    }

    /// Sections written since the last drain, in first-touch order.
    pub fn drain_changes(&mut self) -> Vec<Section> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Back to the initial empty shape.
    pub fn reset(&mut self) {
        self.config = Configuration::default();
        self.file_extra.clear();
        self.changes = Section::ALL.to_vec();
        info!("document reset");
    }

    /// Write the document with a fresh timestamp.
    pub fn save_to(&self, path: &Path) -> ProjectResult<()> {
        let file = DocumentFile {
            timestamp: timestamp_now(),
            configuration: self.config.clone(),
            extra: self.file_extra.clone(),
        };
        save_json(path, &file)?;
        info!(path = %path.display(), "document saved");
        Ok(())
    }

    /// Replace the document with the file at `path`. Every section counts as changed.
    pub fn load_from(&mut self, path: &Path) -> ProjectResult<()> {
        let file = load_json(path)?;
        debug!(path = %path.display(), timestamp = %file.timestamp, "document loaded");
        self.config = file.configuration;
        self.file_extra = file.extra;
        self.changes = Section::ALL.to_vec();
        Ok(())
    }

    fn touch(&mut self, section: Section) {
        if !self.changes.contains(&section) {
            self.changes.push(section);
        }
    }
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS.sss`.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OutputCount;
    use serde_json::json;

    #[test]
    fn set_records_change_once() {
        let mut store = DocumentStore::new();
        store.set_pumps(vec![PumpRow::new("p1", "WP", OutputCount::One)]);
        store.set_pumps(vec![PumpRow::new("p1", "WP", OutputCount::Two)]);
        assert_eq!(store.drain_changes(), vec![Section::Pumps]);
        assert!(!store.has_changes());
    }

    #[test]
    fn json_get_set_round_trip() {
        let mut store = DocumentStore::new();
        store
            .set(
                Section::WashingComponents,
                json!([{ "id": "wc1", "Component": "Lidar" }]),
            )
            .unwrap();
        assert_eq!(store.washing_components()[0].name, "Lidar");
        let value = store.get(Section::WashingComponents).unwrap();
        assert_eq!(value[0]["Component"], "Lidar");
    }

    #[test]
    fn bad_value_leaves_section_untouched() {
        let mut store = DocumentStore::new();
        store.set_pumps(vec![PumpRow::new("p1", "WP", OutputCount::One)]);
        store.drain_changes();
        assert!(store.set(Section::Pumps, json!("not a list")).is_err());
        assert_eq!(store.pumps().len(), 1);
        assert!(!store.has_changes());
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = DocumentStore::new();
        store.set_washing_components(vec![WashingComponentRow::new("a", "A")]);
        store.reset();
        assert!(store.washing_components().is_empty());
        assert_eq!(store.drain_changes().len(), 5);
    }

    #[test]
    fn timestamp_format() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), "2024-01-01 12:00:00.000".len());
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[19..20], ".");
    }
}
