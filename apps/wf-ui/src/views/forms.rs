//! Form pages: general settings, washing components, pumps.

use wf_app::pages::{GeneralSettingsPage, PumpsPage, WashingComponentsPage};
use wf_app::Notice;
use wf_project::{
    Catalog, Measured, OutputCount, TemperatureUnit, VoltageUnit, VolumeUnit,
};

#[derive(Debug, Clone)]
pub struct FormsView {
    catalog_pick: usize,
    custom_component: String,
    pump_category: String,
    pump_name: String,
    pump_outputs: u32,
}

impl Default for FormsView {
    fn default() -> Self {
        Self {
            catalog_pick: 0,
            custom_component: String::new(),
            pump_category: String::new(),
            pump_name: String::new(),
            pump_outputs: 1,
        }
    }
}

impl FormsView {
    pub fn show_general(&mut self, ui: &mut egui::Ui, page: &mut GeneralSettingsPage, catalog: &Catalog) {
        let form = &mut page.form;
        egui::Grid::new("general_settings")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Liquid");
                choice_combo(ui, "liquid", &mut form.liquid_name, &catalog.fluid_names());
                ui.end_row();

                ui.label("Vehicle");
                ui.text_edit_singleline(&mut form.vehicle);
                ui.end_row();

                ui.label("Liquid temperature");
                measured_input(
                    ui,
                    "temperature",
                    &mut form.liquid_temperature,
                    &[(TemperatureUnit::Celsius, "°C"), (TemperatureUnit::Kelvin, "°K")],
                );
                ui.end_row();

                ui.label("Liquid volume");
                measured_input(
                    ui,
                    "volume",
                    &mut form.liquid_volume,
                    &[(VolumeUnit::Litre, "L"), (VolumeUnit::Millilitre, "mL")],
                );
                ui.end_row();

                ui.label("Power voltage");
                measured_input(
                    ui,
                    "voltage",
                    &mut form.power_voltage,
                    &[(VoltageUnit::Volt, "V"), (VoltageUnit::Millivolt, "mV")],
                );
                ui.end_row();

                ui.label("Dirt type");
                choice_combo(ui, "dirt", &mut form.dirt_type, &catalog.dirt_types());
                ui.end_row();
            });

        if let Some(problem) = page.problem() {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::from_rgb(230, 160, 0), problem);
        }
    }

    pub fn show_washing(
        &mut self,
        ui: &mut egui::Ui,
        page: &mut WashingComponentsPage,
        catalog: &Catalog,
        notices: &mut Vec<Notice>,
    ) {
        ui.horizontal(|ui| {
            let names: Vec<&str> = catalog
                .washing_components
                .iter()
                .map(|e| e.name.as_str())
                .collect();
            self.catalog_pick = self.catalog_pick.min(names.len().saturating_sub(1));
            egui::ComboBox::from_id_salt("catalog_component")
                .selected_text(names.get(self.catalog_pick).copied().unwrap_or("(catalog empty)"))
                .show_ui(ui, |ui| {
                    for (i, name) in names.iter().enumerate() {
                        ui.selectable_value(&mut self.catalog_pick, i, *name);
                    }
                });
            if ui.button("Add from catalog").clicked() {
                if let Some(entry) = catalog.washing_components.get(self.catalog_pick) {
                    page.add_from_catalog(entry);
                }
            }
            ui.separator();
            ui.text_edit_singleline(&mut self.custom_component);
            if ui.button("Add").clicked() {
                match page.add_row(&self.custom_component) {
                    Ok(_) => self.custom_component.clear(),
                    Err(err) => notices.push(Notice::warning(err.to_string())),
                }
            }
        });
        ui.separator();

        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("washing_rows")
                .num_columns(7)
                .striped(true)
                .show(ui, |ui| {
                    for header in [
                        "Component",
                        "Nozzle Ref",
                        "D_C_N (mm)",
                        "DZ_P_N (mm)",
                        "Integration angle",
                        "Target performance (%)",
                        "",
                    ] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for (i, row) in page.rows.iter_mut().enumerate() {
                        ui.text_edit_singleline(&mut row.name);
                        ui.text_edit_singleline(&mut row.nozzle_ref);
                        ui.text_edit_singleline(&mut row.d_c_n_mm);
                        ui.text_edit_singleline(&mut row.dz_p_n_mm);
                        ui.text_edit_singleline(&mut row.integration_angle);
                        ui.text_edit_singleline(&mut row.target_performance);
                        if ui.small_button("🗑").clicked() {
                            remove = Some(i);
                        }
                        ui.end_row();
                    }
                });
        });
        if let Some(i) = remove {
            if let Err(err) = page.remove_row(i) {
                notices.push(Notice::error(err.to_string()));
            }
        }

        show_problems(ui, &page.problems());
    }

    pub fn show_pumps(&mut self, ui: &mut egui::Ui, page: &mut PumpsPage, notices: &mut Vec<Notice>) {
        ui.horizontal(|ui| {
            ui.label("Category");
            ui.text_edit_singleline(&mut self.pump_category);
            ui.label("Name");
            ui.text_edit_singleline(&mut self.pump_name);
            ui.label("Outputs");
            ui.radio_value(&mut self.pump_outputs, 1, "1");
            ui.radio_value(&mut self.pump_outputs, 2, "2");
            if ui.button("Add pump").clicked() {
                match page.add_pump(&self.pump_category, &self.pump_name, self.pump_outputs) {
                    Ok(_) => self.pump_name.clear(),
                    Err(err) => notices.push(Notice::warning(err.to_string())),
                }
            }
        });
        ui.separator();

        let mut remove = None;
        egui::Grid::new("pump_rows")
            .num_columns(6)
            .striped(true)
            .show(ui, |ui| {
                for header in ["Category", "Name", "Outputs", "WC (O1)", "WC (O2)", ""] {
                    ui.strong(header);
                }
                ui.end_row();

                for (i, row) in page.rows.iter_mut().enumerate() {
                    ui.text_edit_singleline(&mut row.category);
                    ui.text_edit_singleline(&mut row.name);
                    ui.horizontal(|ui| {
                        ui.radio_value(&mut row.outputs, OutputCount::One, "1");
                        ui.radio_value(&mut row.outputs, OutputCount::Two, "2");
                    });
                    ui.text_edit_singleline(&mut row.wc_output_1);
                    ui.add_enabled_ui(row.outputs == OutputCount::Two, |ui| {
                        ui.text_edit_singleline(&mut row.wc_output_2);
                    });
                    if ui.small_button("🗑").clicked() {
                        remove = Some(i);
                    }
                    ui.end_row();
                }
            });
        if let Some(i) = remove {
            if let Err(err) = page.remove_pump(i) {
                notices.push(Notice::error(err.to_string()));
            }
        }

        show_problems(ui, &page.problems());
    }
}

fn choice_combo(ui: &mut egui::Ui, id: &str, value: &mut String, choices: &[&str]) {
    let shown = if value.is_empty() { "Select…" } else { value.as_str() };
    egui::ComboBox::from_id_salt(id)
        .selected_text(shown.to_string())
        .show_ui(ui, |ui| {
            for choice in choices {
                ui.selectable_value(value, choice.to_string(), *choice);
            }
        });
}

fn measured_input<U>(ui: &mut egui::Ui, id: &str, measured: &mut Measured<U>, units: &[(U, &str)])
where
    U: Default + Copy + PartialEq,
{
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut measured.value).desired_width(80.0));
        let current = units
            .iter()
            .find(|(u, _)| *u == measured.unit)
            .map_or("", |(_, label)| *label);
        egui::ComboBox::from_id_salt(id)
            .width(60.0)
            .selected_text(current)
            .show_ui(ui, |ui| {
                for (unit, label) in units {
                    ui.selectable_value(&mut measured.unit, *unit, *label);
                }
            });
    });
}

fn show_problems(ui: &mut egui::Ui, problems: &[String]) {
    if problems.is_empty() {
        return;
    }
    ui.add_space(8.0);
    for problem in problems {
        ui.colored_label(egui::Color32::from_rgb(230, 160, 0), problem);
    }
}
