//! Wizard pages. Each page binds to one document section.

mod circuits;
mod general;
mod pumps;
mod results;
mod sequence;
mod washing;

pub use circuits::CircuitsPage;
pub use general::GeneralSettingsPage;
pub use pumps::PumpsPage;
pub use results::{ResultsPage, ResultsSummary};
pub use sequence::SequencePage;
pub use washing::WashingComponentsPage;

use wf_project::DocumentStore;

use crate::error::AppResult;
use crate::settings::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageId {
    GeneralSettings,
    WashingComponents,
    Pumps,
    Circuits,
    Sequence,
    Results,
}

impl PageId {
    pub const ALL: [PageId; 6] = [
        PageId::GeneralSettings,
        PageId::WashingComponents,
        PageId::Pumps,
        PageId::Circuits,
        PageId::Sequence,
        PageId::Results,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            PageId::GeneralSettings => "General settings",
            PageId::WashingComponents => "Washing components",
            PageId::Pumps => "Pumps",
            PageId::Circuits => "Circuits",
            PageId::Sequence => "Sequence",
            PageId::Results => "Results",
        }
    }

    pub fn next(self) -> Option<PageId> {
        PageId::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<PageId> {
        self.index().checked_sub(1).map(|i| PageId::ALL[i])
    }
}

/// Page lifecycle driven by the navigator.
pub trait Page {
    fn id(&self) -> PageId;

    /// Write the page's section into the document.
    fn on_leave_page(&mut self, store: &mut DocumentStore) -> AppResult<()>;

    /// Reload page state from the document.
    fn refresh_configuration(&mut self, store: &DocumentStore) -> AppResult<()>;

    /// Called after a refresh when the page becomes current; returns the completion flag.
    fn on_show_page(&mut self) -> bool {
        self.is_completed()
    }

    fn is_completed(&self) -> bool;
}

/// The six pages, in wizard order.
pub struct Pages {
    pub general: GeneralSettingsPage,
    pub washing: WashingComponentsPage,
    pub pumps: PumpsPage,
    pub circuits: CircuitsPage,
    pub sequence: SequencePage,
    pub results: ResultsPage,
}

impl Pages {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            general: GeneralSettingsPage::default(),
            washing: WashingComponentsPage::default(),
            pumps: PumpsPage::default(),
            circuits: CircuitsPage::new(settings.clone()),
            sequence: SequencePage::default(),
            results: ResultsPage::default(),
        }
    }

    pub fn page(&self, id: PageId) -> &dyn Page {
        match id {
            PageId::GeneralSettings => &self.general,
            PageId::WashingComponents => &self.washing,
            PageId::Pumps => &self.pumps,
            PageId::Circuits => &self.circuits,
            PageId::Sequence => &self.sequence,
            PageId::Results => &self.results,
        }
    }

    pub fn page_mut(&mut self, id: PageId) -> &mut dyn Page {
        match id {
            PageId::GeneralSettings => &mut self.general,
            PageId::WashingComponents => &mut self.washing,
            PageId::Pumps => &mut self.pumps,
            PageId::Circuits => &mut self.circuits,
            PageId::Sequence => &mut self.sequence,
            PageId::Results => &mut self.results,
        }
    }

    /// Drop all page state. Editors release their components first.
    pub fn reset(&mut self) {
        self.general = GeneralSettingsPage::default();
        self.washing = WashingComponentsPage::default();
        self.pumps = PumpsPage::default();
        self.circuits.clear();
        self.sequence = SequencePage::default();
        self.results = ResultsPage::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_order() {
        assert_eq!(PageId::GeneralSettings.previous(), None);
        assert_eq!(PageId::Pumps.next(), Some(PageId::Circuits));
        assert_eq!(PageId::Results.next(), None);
        for (i, id) in PageId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }
}
