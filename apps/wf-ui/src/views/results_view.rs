use wf_app::Session;
use wf_sequence::{format_tick, tick_interval};

/// Read-only overview of the whole configuration.
#[derive(Debug, Default)]
pub struct ResultsView;

impl ResultsView {
    pub fn show(&self, ui: &mut egui::Ui, session: &Session) {
        let summary = session.pages.results.summary();
        let interval = tick_interval(summary.total_duration_s);

        egui::Grid::new("results_summary")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label("Washing components");
                ui.label(summary.washing_components.to_string());
                ui.end_row();
                ui.label("Pumps");
                ui.label(summary.pumps.to_string());
                ui.end_row();
                ui.label("Circuits");
                ui.label(summary.circuits.to_string());
                ui.end_row();
                ui.label("Connected components");
                ui.label(summary.reached_components.to_string());
                ui.end_row();
                ui.label("Activation tasks");
                ui.label(summary.tasks.to_string());
                ui.end_row();
                ui.label("Total duration");
                ui.label(format_tick(summary.total_duration_s, interval));
                ui.end_row();
            });

        ui.separator();
        match &summary.problem {
            Some(problem) => {
                ui.colored_label(egui::Color32::from_rgb(220, 50, 50), problem);
            }
            None => {
                ui.colored_label(egui::Color32::from_rgb(0, 170, 0), "Configuration is valid");
            }
        }

        ui.separator();
        ui.strong("Pages");
        for page in wf_app::PageId::ALL {
            let mark = if session.navigator.is_completed(page) { "✓" } else { "○" };
            ui.label(format!("{mark} {}", page.title()));
        }
    }
}
