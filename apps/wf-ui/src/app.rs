use crate::views::{CircuitView, FormsView, ResultsView, SequenceView};
use egui_file_dialog::{DialogMode, FileDialog};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use wf_app::{AppError, AppSettings, Notice, NoticeLevel, PageId, Session, SETTINGS_FILE};
use wf_project::Catalog;

/// Notices kept on screen.
const MAX_NOTICES: usize = 6;

pub struct WashflowApp {
    settings: AppSettings,
    catalog: Catalog,
    session: Option<Session>,
    file_dialog: FileDialog,
    file_dialog_action: Option<FileDialogAction>,
    last_directory: Option<PathBuf>,
    confirm_reset: bool,
    notices: Vec<Notice>,
    forms_view: FormsView,
    circuit_view: CircuitView,
    sequence_view: SequenceView,
    results_view: ResultsView,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileDialogAction {
    Open,
    SaveAs,
}

/// Requests collected while panels borrow the session.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    New,
    Open,
    Save,
    SaveAs,
    Reset,
    GoTo(PageId),
}

impl WashflowApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load_or_default(Path::new(SETTINGS_FILE));
        let catalog = Catalog::load(&settings.catalog_dir);
        if !catalog.degraded.is_empty() {
            info!(tables = ?catalog.degraded, "using built-in catalog values");
        }

        Self {
            settings,
            catalog,
            session: None,
            file_dialog: FileDialog::new(),
            file_dialog_action: None,
            last_directory: None,
            confirm_reset: false,
            notices: Vec::new(),
            forms_view: FormsView::default(),
            circuit_view: CircuitView::default(),
            sequence_view: SequenceView::default(),
            results_view: ResultsView,
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        let excess = self.notices.len().saturating_sub(MAX_NOTICES);
        self.notices.drain(..excess);
    }

    fn report(&mut self, err: AppError) {
        self.notify(Notice::error(err.to_string()));
    }

    fn new_session(&mut self) {
        self.session = Some(Session::new(self.settings.clone(), self.catalog.clone()));
        self.circuit_view = CircuitView::default();
        self.notices.clear();
    }

    fn open_session(&mut self, path: PathBuf) {
        if let Some(parent) = path.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
        let result = if let Some(session) = self.session.as_mut() {
            session.load(&path)
        } else {
            Session::open(self.settings.clone(), self.catalog.clone(), &path).map(|session| {
                self.session = Some(session);
            })
        };
        match result {
            Ok(()) => {
                self.circuit_view = CircuitView::default();
                self.notify(Notice::info(format!("Loaded {}", path.display())));
            }
            Err(err) => self.report(err),
        }
    }

    fn save(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.save_current() {
            Ok(Some(path)) => self.notify(Notice::info(format!("Saved {}", path.display()))),
            Ok(None) => self.request_file(FileDialogAction::SaveAs),
            Err(err) => self.report(err),
        }
    }

    fn save_as(&mut self, path: PathBuf) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.save(&path) {
            Ok(()) => {
                if let Some(parent) = path.parent() {
                    self.last_directory = Some(parent.to_path_buf());
                }
                self.notify(Notice::info(format!("Saved {}", path.display())));
            }
            Err(err) => self.report(err),
        }
    }

    fn request_file(&mut self, action: FileDialogAction) {
        self.file_dialog_action = Some(action);
        match action {
            FileDialogAction::Open => {
                let initial_dir = self.last_directory.as_ref().and_then(|p| p.to_str());
                let _ = self
                    .file_dialog
                    .open(DialogMode::SelectFile, true, initial_dir);
            }
            FileDialogAction::SaveAs => self.file_dialog.save_file(),
        }
    }

    fn go_to(&mut self, page: PageId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(err) = session.go_to(page) {
            self.report(err);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::New => self.new_session(),
            Action::Open => self.request_file(FileDialogAction::Open),
            Action::Save => self.save(),
            Action::SaveAs => self.request_file(FileDialogAction::SaveAs),
            Action::Reset => self.confirm_reset = true,
            Action::GoTo(page) => self.go_to(page),
        }
    }

    fn show_start(&mut self, ctx: &egui::Context) -> Option<Action> {
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.heading("Washflow");
                ui.label("Washing installation configuration");
                ui.add_space(16.0);
                if ui.button("New configuration").clicked() {
                    action = Some(Action::New);
                }
                if ui.button("Load configuration…").clicked() {
                    action = Some(Action::Open);
                }
                ui.add_space(16.0);
                show_notices(ui, &self.notices);
            });
        });
        action
    }

    fn show_reset_confirm(&mut self, ctx: &egui::Context) {
        if !self.confirm_reset {
            return;
        }
        let mut decision = None;
        egui::Window::new("Reset configuration")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Discard every page of the current configuration?");
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });
        if let Some(confirmed) = decision {
            self.confirm_reset = false;
            if confirmed {
                if let Some(session) = self.session.as_mut() {
                    session.reset();
                }
                self.circuit_view = CircuitView::default();
                self.notify(Notice::info("Configuration reset"));
            }
        }
    }
}

impl eframe::App for WashflowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_selected() {
            match self.file_dialog_action.take() {
                Some(FileDialogAction::Open) => self.open_session(path.to_path_buf()),
                Some(FileDialogAction::SaveAs) => self.save_as(path.to_path_buf()),
                None => {}
            }
        }

        let Some(session) = self.session.as_mut() else {
            if let Some(action) = self.show_start(ctx) {
                self.apply(action);
            }
            return;
        };

        let current = session.current_page();
        if current == PageId::Circuits {
            if session.pages.circuits.poll_synthesis(Instant::now()) {
                ctx.request_repaint();
            }
            ctx.request_repaint_after(self.settings.synthesis_period());
        }

        let mut action = None;
        let mut fresh: Vec<Notice> = Vec::new();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("New").clicked() {
                    action = Some(Action::New);
                }
                if ui.button("Open").clicked() {
                    action = Some(Action::Open);
                }
                if ui.button("Save").clicked() {
                    action = Some(Action::Save);
                }
                if ui.button("Save As").clicked() {
                    action = Some(Action::SaveAs);
                }
                ui.separator();
                if ui.button("Reset").clicked() {
                    action = Some(Action::Reset);
                }
                ui.separator();
                match session.path() {
                    Some(path) => ui.label(path.display().to_string()),
                    None => ui.weak("Unsaved configuration"),
                };
            });
        });

        egui::SidePanel::left("pages")
            .default_width(200.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Pages");
                ui.separator();
                for page in PageId::ALL {
                    let mark = if session.navigator.is_completed(page) {
                        egui::RichText::new("✓").color(egui::Color32::from_rgb(0, 170, 0))
                    } else {
                        egui::RichText::new("○").color(egui::Color32::GRAY)
                    };
                    ui.horizontal(|ui| {
                        ui.label(mark);
                        if ui.selectable_label(page == current, page.title()).clicked()
                            && page != current
                        {
                            action = Some(Action::GoTo(page));
                        }
                    });
                }
            });

        egui::TopBottomPanel::bottom("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_enabled_ui(current.previous().is_some(), |ui| {
                    if ui.button("◀ Previous").clicked() {
                        action = current.previous().map(Action::GoTo);
                    }
                });
                ui.add_enabled_ui(current.next().is_some(), |ui| {
                    if ui.button("Next ▶").clicked() {
                        action = current.next().map(Action::GoTo);
                    }
                });
            });
            show_notices(ui, &self.notices);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(current.title());
            ui.separator();
            let catalog = &session.catalog;
            match current {
                PageId::GeneralSettings => {
                    self.forms_view.show_general(ui, &mut session.pages.general, catalog)
                }
                PageId::WashingComponents => self.forms_view.show_washing(
                    ui,
                    &mut session.pages.washing,
                    catalog,
                    &mut fresh,
                ),
                PageId::Pumps => {
                    self.forms_view
                        .show_pumps(ui, &mut session.pages.pumps, &mut fresh)
                }
                PageId::Circuits => {
                    self.circuit_view
                        .show(ui, &mut session.pages.circuits, catalog, &mut fresh)
                }
                PageId::Sequence => {
                    self.sequence_view
                        .show(ui, &mut session.pages.sequence, &mut fresh)
                }
                PageId::Results => self.results_view.show(ui, session),
            }
        });

        for notice in fresh {
            self.notify(notice);
        }
        self.show_reset_confirm(ctx);
        if let Some(action) = action {
            self.apply(action);
        }
    }
}

fn show_notices(ui: &mut egui::Ui, notices: &[Notice]) {
    for notice in notices.iter().rev() {
        let color = match notice.level {
            NoticeLevel::Info => ui.visuals().text_color(),
            NoticeLevel::Warning => egui::Color32::from_rgb(230, 160, 0),
            NoticeLevel::Error => egui::Color32::from_rgb(220, 50, 50),
        };
        ui.colored_label(color, &notice.text);
    }
}
