//! Page navigation and completion flags.

use tracing::{debug, warn};
use wf_project::DocumentStore;

use crate::error::AppResult;
use crate::pages::{PageId, Pages};

/// Current page plus one completion flag per page.
///
/// Flags only drive the indicator; any page can be reached from any other.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: PageId,
    completed: [bool; PageId::ALL.len()],
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: PageId::GeneralSettings,
            completed: [false; PageId::ALL.len()],
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PageId {
        self.current
    }

    pub fn is_completed(&self, page: PageId) -> bool {
        self.completed[page.index()]
    }

    /// Leave the current page, switch, refresh the target and show it.
    pub fn go_to(&mut self, target: PageId, pages: &mut Pages, store: &mut DocumentStore) -> AppResult<()> {
        let from = self.current;
        {
            let page = pages.page_mut(from);
            page.on_leave_page(store)?;
            self.completed[from.index()] = page.is_completed();
        }
        let touched = store.drain_changes();
        debug!(from = ?from, to = ?target, touched = touched.len(), "page transition");

        self.current = target;
        self.show_current(pages, store)
    }

    pub fn next(&mut self, pages: &mut Pages, store: &mut DocumentStore) -> AppResult<bool> {
        match self.current.next() {
            Some(target) => self.go_to(target, pages, store).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn previous(&mut self, pages: &mut Pages, store: &mut DocumentStore) -> AppResult<bool> {
        match self.current.previous() {
            Some(target) => self.go_to(target, pages, store).map(|_| true),
            None => Ok(false),
        }
    }

    /// Refresh and show the current page without leaving it first.
    pub fn show_current(&mut self, pages: &mut Pages, store: &DocumentStore) -> AppResult<()> {
        let page = pages.page_mut(self.current);
        page.refresh_configuration(store)?;
        self.completed[self.current.index()] = page.on_show_page();
        Ok(())
    }

    /// Recompute every flag from the document, leaving the current page shown.
    pub fn refresh_all(&mut self, pages: &mut Pages, store: &DocumentStore) {
        for id in PageId::ALL {
            let page = pages.page_mut(id);
            match page.refresh_configuration(store) {
                Ok(()) => self.completed[id.index()] = page.is_completed(),
                Err(err) => {
                    warn!(page = ?id, error = %err, "page refresh failed");
                    self.completed[id.index()] = false;
                }
            }
        }
    }

    /// Back to the first page with every flag cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
