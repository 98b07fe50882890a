//! A configuration session: document, pages, navigation, file actions.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use wf_project::{validate_document, Catalog, DocumentStore};

use crate::error::AppResult;
use crate::navigation::Navigator;
use crate::pages::{PageId, Pages};
use crate::settings::AppSettings;

pub struct Session {
    pub settings: AppSettings,
    pub catalog: Catalog,
    pub store: DocumentStore,
    pub pages: Pages,
    pub navigator: Navigator,
    path: Option<PathBuf>,
}

impl Session {
    /// Empty configuration on the first page.
    pub fn new(settings: AppSettings, catalog: Catalog) -> Self {
        let pages = Pages::new(&settings);
        let mut session = Self {
            settings,
            catalog,
            store: DocumentStore::new(),
            pages,
            navigator: Navigator::new(),
            path: None,
        };
        session.show_first_page();
        session
    }

    /// Session for a saved document.
    pub fn open(settings: AppSettings, catalog: Catalog, path: &Path) -> AppResult<Self> {
        let mut session = Self::new(settings, catalog);
        session.load(path)?;
        Ok(session)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current_page(&self) -> PageId {
        self.navigator.current()
    }

    pub fn go_to(&mut self, page: PageId) -> AppResult<()> {
        self.navigator.go_to(page, &mut self.pages, &mut self.store)
    }

    /// Replace the document with the file at `path`.
    ///
    /// The current document is untouched when the file cannot be read.
    pub fn load(&mut self, path: &Path) -> AppResult<()> {
        let mut store = DocumentStore::new();
        store.load_from(path)?;
        if let Err(err) = validate_document(store.config()) {
            warn!(path = %path.display(), error = %err, "loaded document has problems");
        }
        self.pages.reset();
        self.store = store;
        self.navigator.reset();
        self.navigator.refresh_all(&mut self.pages, &self.store);
        self.show_first_page();
        self.store.drain_changes();
        self.path = Some(path.to_path_buf());
        info!(path = %path.display(), "configuration loaded");
        Ok(())
    }

    /// Write the current page into the document, then the document to `path`.
    pub fn save(&mut self, path: &Path) -> AppResult<()> {
        let current = self.navigator.current();
        self.pages.page_mut(current).on_leave_page(&mut self.store)?;
        if let Err(err) = self.store.save_to(path) {
            error!(path = %path.display(), error = %err, "save failed");
            return Err(err.into());
        }
        self.path = Some(path.to_path_buf());
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Save to the path the session was loaded from or last saved to.
    pub fn save_current(&mut self) -> AppResult<Option<PathBuf>> {
        let Some(path) = self.path.clone() else {
            return Ok(None);
        };
        self.save(&path)?;
        Ok(Some(path))
    }

    /// Clear the document, every page and every flag.
    pub fn reset(&mut self) {
        self.pages.reset();
        self.store.reset();
        self.navigator.reset();
        self.show_first_page();
        self.store.drain_changes();
        self.path = None;
        info!("configuration reset");
    }

    fn show_first_page(&mut self) {
        if let Err(err) = self.navigator.show_current(&mut self.pages, &self.store) {
            error!(error = %err, "failed to show page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(AppSettings::default(), Catalog::fallback())
    }

    #[test]
    fn navigation_writes_sections_on_leave() {
        let mut s = session();
        s.pages.general.form.vehicle = "Truck".into();
        s.go_to(PageId::Pumps).unwrap();
        assert_eq!(s.store.general_settings().vehicle, "Truck");
        assert_eq!(s.current_page(), PageId::Pumps);
        assert!(!s.navigator.is_completed(PageId::GeneralSettings));
    }

    #[test]
    fn reset_clears_document_and_flags() {
        let mut s = session();
        s.go_to(PageId::WashingComponents).unwrap();
        s.pages.washing.add_row("A").unwrap();
        s.go_to(PageId::Pumps).unwrap();
        assert!(s.navigator.is_completed(PageId::WashingComponents));
        s.reset();
        assert!(s.store.washing_components().is_empty());
        assert!(!s.navigator.is_completed(PageId::WashingComponents));
        assert_eq!(s.current_page(), PageId::GeneralSettings);
        assert!(s.path().is_none());
    }

    #[test]
    fn failed_load_keeps_the_document() {
        let mut s = session();
        s.go_to(PageId::WashingComponents).unwrap();
        s.pages.washing.add_row("A").unwrap();
        s.go_to(PageId::Pumps).unwrap();
        assert!(s.load(Path::new("/no/such/config.json")).is_err());
        assert_eq!(s.store.washing_components().len(), 1);
    }

    #[test]
    fn save_without_path_is_a_no_op() {
        let mut s = session();
        assert_eq!(s.save_current().unwrap(), None);
    }
}
