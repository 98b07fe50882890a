use tracing::debug;
use wf_project::{validate::validate_general_settings, DocumentStore, GeneralSettings};

use super::{Page, PageId};
use crate::error::AppResult;

/// Fluid and environment form.
#[derive(Debug, Default)]
pub struct GeneralSettingsPage {
    pub form: GeneralSettings,
}

impl GeneralSettingsPage {
    /// First validation problem of the form, if any.
    pub fn problem(&self) -> Option<String> {
        for (label, value) in [
            ("liquid name", &self.form.liquid_name),
            ("vehicle", &self.form.vehicle),
            ("dirt type", &self.form.dirt_type),
        ] {
            if value.trim().is_empty() {
                return Some(format!("{label}: a value must be selected"));
            }
        }
        validate_general_settings(&self.form).err().map(|e| e.to_string())
    }
}

impl Page for GeneralSettingsPage {
    fn id(&self) -> PageId {
        PageId::GeneralSettings
    }

    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()> {
        store.set_general_settings(self.form.clone());
        Ok(())
    }

    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()> {
        self.form = store.general_settings().clone();
        debug!(liquid = %self.form.liquid_name, "general settings loaded");
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.problem().is_none()
    }
}
