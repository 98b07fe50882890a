use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot, VLine};
use std::collections::HashMap;
use wf_app::pages::SequencePage;
use wf_app::Notice;
use wf_sequence::{format_tick, tick_interval, DurationUnit, Priority};

const PRIMARY: egui::Color32 = egui::Color32::from_rgb(70, 130, 200);
const SECONDARY: egui::Color32 = egui::Color32::from_rgb(230, 150, 60);

/// Activation table above the timeline plot.
#[derive(Debug, Default)]
pub struct SequenceView {
    /// Duration text being typed, per row; committed on focus loss.
    drafts: HashMap<usize, String>,
}

enum RowEdit {
    Duration(usize, String),
    Unit(usize, DurationUnit),
    Priority(usize, Priority),
    Remove(usize),
}

impl SequenceView {
    pub fn show(&mut self, ui: &mut egui::Ui, page: &mut SequencePage, notices: &mut Vec<Notice>) {
        if page.table().is_empty() {
            ui.label("No washing component is connected to a pump output yet.");
            return;
        }

        let mut edits = Vec::new();
        let table_height = (ui.available_height() * 0.5).max(160.0);
        ui.push_id("sequence_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(table_height)
                .column(Column::exact(50.0)) // Pump
                .column(Column::exact(60.0)) // Output
                .column(Column::initial(200.0).at_least(120.0)) // Component
                .column(Column::initial(100.0).at_least(80.0)) // Duration
                .column(Column::exact(70.0)) // Unit
                .column(Column::exact(110.0)) // Priority
                .column(Column::exact(40.0)) // Remove
                .header(22.0, |mut header| {
                    for title in ["Pump", "Output", "Component", "Duration", "Unit", "Priority", ""] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for (i, row) in page.table().rows().iter().enumerate() {
                        body.row(26.0, |mut tr| {
                            tr.col(|ui| {
                                ui.label((row.pump_index + 1).to_string());
                            });
                            tr.col(|ui| {
                                ui.label(row.output_index.to_string());
                            });
                            tr.col(|ui| {
                                ui.label(&row.display_name);
                            });
                            tr.col(|ui| {
                                let draft = self
                                    .drafts
                                    .entry(i)
                                    .or_insert_with(|| row.duration.clone());
                                let response = ui.add(
                                    egui::TextEdit::singleline(draft).desired_width(f32::INFINITY),
                                );
                                if response.lost_focus() {
                                    if let Some(text) = self.drafts.remove(&i) {
                                        if text != row.duration {
                                            edits.push(RowEdit::Duration(i, text));
                                        }
                                    }
                                } else if !response.has_focus() {
                                    self.drafts.remove(&i);
                                }
                            });
                            tr.col(|ui| {
                                let mut unit = row.unit;
                                egui::ComboBox::from_id_salt(("unit", i))
                                    .width(50.0)
                                    .selected_text(unit.tag())
                                    .show_ui(ui, |ui| {
                                        for u in DurationUnit::ALL {
                                            ui.selectable_value(&mut unit, u, u.tag());
                                        }
                                    });
                                if unit != row.unit {
                                    edits.push(RowEdit::Unit(i, unit));
                                }
                            });
                            tr.col(|ui| {
                                let mut priority = row.priority;
                                ui.radio_value(&mut priority, Priority::Primary, "P");
                                ui.radio_value(&mut priority, Priority::Secondary, "S");
                                if priority != row.priority {
                                    edits.push(RowEdit::Priority(i, priority));
                                }
                            });
                            tr.col(|ui| {
                                if ui.small_button("🗑").clicked() {
                                    edits.push(RowEdit::Remove(i));
                                }
                            });
                        });
                    }
                });
        });

        for edit in edits {
            let result = match edit {
                RowEdit::Duration(i, text) => page.enter_duration(i, &text).map(|_| ()),
                RowEdit::Unit(i, unit) => page.set_unit(i, unit),
                RowEdit::Priority(i, priority) => page.set_priority(i, priority).map(|_| ()),
                RowEdit::Remove(i) => {
                    self.drafts.clear();
                    page.remove_row(i)
                }
            };
            if let Err(err) = result {
                notices.push(Notice::warning(err.to_string()));
            }
        }

        for conflict in page.conflicts() {
            ui.colored_label(egui::Color32::from_rgb(230, 160, 0), conflict.to_string());
        }

        ui.separator();
        show_timeline(ui, page);
    }
}

fn show_timeline(ui: &mut egui::Ui, page: &SequencePage) {
    let timeline = page.timeline();
    if timeline.is_empty() {
        ui.weak("Enter durations to see the timeline.");
        return;
    }

    let interval = tick_interval(timeline.total_duration_s);
    ui.label(format!(
        "Total duration: {}",
        format_tick(timeline.total_duration_s, interval)
    ));

    let lanes = timeline.spans.len();
    let bars: Vec<(Priority, Bar)> = timeline
        .spans
        .iter()
        .enumerate()
        .map(|(lane, span)| {
            let color = match span.priority {
                Priority::Primary => PRIMARY,
                Priority::Secondary => SECONDARY,
            };
            let bar = Bar::new((lanes - lane) as f64, span.duration_s())
                .base_offset(span.start_s)
                .width(0.6)
                .name(format!("P{} O{} {}", span.pump_index + 1, span.output_index, span.label))
                .fill(color);
            (span.priority, bar)
        })
        .collect();
    let (primary, secondary): (Vec<_>, Vec<_>) =
        bars.into_iter().partition(|(p, _)| *p == Priority::Primary);

    Plot::new("timeline_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .x_axis_formatter(move |mark, _range| format_tick(mark.value, interval))
        .show_y(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(primary.into_iter().map(|(_, b)| b).collect())
                    .horizontal()
                    .color(PRIMARY)
                    .name("Primary"),
            );
            plot_ui.bar_chart(
                BarChart::new(secondary.into_iter().map(|(_, b)| b).collect())
                    .horizontal()
                    .color(SECONDARY)
                    .name("Secondary"),
            );
            for (pump, total) in &timeline.pump_totals {
                plot_ui.vline(VLine::new(*total).name(format!("Pump {} end", pump + 1)));
            }
        });
}
