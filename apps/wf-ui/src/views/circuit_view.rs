//! One canvas per pump, with the palette and the pipe dialog.

use tracing::debug;
use wf_app::pages::CircuitsPage;
use wf_app::{CanvasEditor, CursorShape, EditorMode, Notice, PipeDialog, PipeTarget, PointerOutcome, Selection};
use wf_core::{format_number, Point};
use wf_graph::{CircuitNode, Inclination, NodeKind};
use wf_project::{Catalog, WashingComponentRow};

const CANVAS_BG: egui::Color32 = egui::Color32::from_gray(30);
const PIPE_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 230);
const SOURCE_COLOR: egui::Color32 = egui::Color32::from_rgb(240, 200, 40);

#[derive(Debug, Default)]
pub struct CircuitView {
    selected_pump: usize,
    /// Pump whose canvas reset awaits confirmation.
    pending_reset: Option<usize>,
}

impl CircuitView {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        page: &mut CircuitsPage,
        catalog: &Catalog,
        notices: &mut Vec<Notice>,
    ) {
        if page.editors().is_empty() {
            ui.label("Add at least one pump to draw circuits.");
            return;
        }
        self.selected_pump = self.selected_pump.min(page.editors().len() - 1);

        ui.horizontal(|ui| {
            for (i, editor) in page.editors().iter().enumerate() {
                let title = format!("Pump {} - {}", i + 1, editor.pump_row().name);
                ui.selectable_value(&mut self.selected_pump, i, title);
            }
        });
        ui.separator();

        let rows = page.components().to_vec();
        let available: Vec<(String, String)> = page
            .available_components()
            .into_iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect();
        let issues = page.issues();
        let interpretation = page.interpretations().get(self.selected_pump).cloned();

        let index = self.selected_pump;
        if let Some((editor, bus)) = page.editor_and_bus(index) {
            egui::SidePanel::right("circuit_palette")
                .default_width(240.0)
                .show_inside(ui, |ui| {
                    show_palette(ui, editor, bus, &available, &rows);
                    ui.separator();
                    ui.strong("Outputs");
                    match &interpretation {
                        Some(interp) if !interp.outputs.is_empty() => {
                            for (output, reached) in &interp.outputs {
                                let names: Vec<&str> =
                                    reached.iter().map(|c| c.name.as_str()).collect();
                                ui.label(format!("Output {output}: {}", names.join(", ")));
                            }
                        }
                        _ => {
                            ui.weak("Nothing connected yet");
                        }
                    }
                    for issue in &issues {
                        ui.colored_label(egui::Color32::from_rgb(220, 50, 50), issue);
                    }
                });

            egui::CentralPanel::default().show_inside(ui, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    if show_canvas(ui, editor, bus, catalog) {
                        self.pending_reset = Some(index);
                    }
                });
            });

            let ctx = ui.ctx().clone();
            show_pipe_dialog(&ctx, editor, bus, catalog);

            if self.pending_reset == Some(index) {
                match confirm_reset(&ctx, &editor.pump_row().name) {
                    Some(true) => {
                        editor.reset(bus);
                        self.pending_reset = None;
                    }
                    Some(false) => self.pending_reset = None,
                    None => {}
                }
            }
        }

        notices.extend(page.drain_notices());
    }
}

fn show_palette(
    ui: &mut egui::Ui,
    editor: &mut CanvasEditor,
    bus: &mut wf_app::EventBus,
    available: &[(String, String)],
    rows: &[WashingComponentRow],
) {
    ui.strong("Mode");
    ui.horizontal(|ui| {
        for (mode, label) in [
            (EditorMode::Move, "Move"),
            (EditorMode::Connect, "Connect"),
            (EditorMode::Delete, "Delete"),
        ] {
            if ui.selectable_label(editor.mode() == mode, label).clicked() {
                editor.set_mode(mode);
            }
        }
    });

    ui.separator();
    ui.strong("Connectors");
    for kind in NodeKind::CONNECTORS {
        let selected = editor.selection() == Some(&Selection::Connector(kind));
        if ui.selectable_label(selected, kind.label()).clicked() {
            if let Err(err) = editor.select_connector(kind) {
                debug!(error = %err, "connector selection refused");
            }
        }
    }

    ui.separator();
    ui.strong("Washing components");
    if available.is_empty() {
        ui.weak("All components are placed");
    }
    egui::ScrollArea::vertical()
        .id_salt("available_components")
        .max_height(240.0)
        .show(ui, |ui| {
            for (id, name) in available {
                let selected = matches!(
                    editor.selection(),
                    Some(Selection::Component { id: sel, .. }) if sel == id
                );
                if ui.selectable_label(selected, name).clicked() {
                    if let Err(err) = editor.select_component(id, rows, bus) {
                        debug!(error = %err, "component selection refused");
                    }
                }
            }
        });
}

/// Draw and drive one canvas. Returns true when a reset was requested.
fn show_canvas(
    ui: &mut egui::Ui,
    editor: &mut CanvasEditor,
    bus: &mut wf_app::EventBus,
    catalog: &Catalog,
) -> bool {
    let canvas = editor.circuit().canvas();
    let size = egui::vec2(canvas.width as f32, canvas.height as f32);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;
    let to_screen = |p: Point| rect.min + egui::vec2(p.x as f32, p.y as f32);
    let to_canvas =
        |pos: egui::Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

    let mut reset_requested = false;
    let (pressed, down, released, pointer) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
        )
    });

    if let Some(pos) = pointer {
        let p = to_canvas(pos);
        if pressed && response.hovered() {
            let outcome = editor.pointer_press(p, bus, catalog);
            debug!(?outcome, "canvas press");
            reset_requested = outcome == PointerOutcome::ResetRequested;
        } else if down && editor.dragging().is_some() {
            editor.pointer_motion(p);
        } else if released && editor.dragging().is_some() {
            editor.pointer_release(p, bus);
        }
    }

    if let Some(pos) = response.hover_pos() {
        ui.ctx().set_cursor_icon(cursor_icon(editor.hover(to_canvas(pos))));
    }

    painter.rect_filled(rect, 0.0, CANVAS_BG);

    let circuit = editor.circuit();
    for pipe in circuit.pipes() {
        let (Some(a), Some(b)) = (circuit.node(pipe.source), circuit.node(pipe.target)) else {
            continue;
        };
        let (pa, pb) = (to_screen(a.position), to_screen(b.position));
        let stroke = match pipe.parameters.inclination {
            Inclination::Straight => egui::Stroke::new(2.0, PIPE_COLOR),
            Inclination::Bent => egui::Stroke::new(3.0, PIPE_COLOR),
        };
        painter.line_segment([pa, pb], stroke);
        draw_arrow_head(&painter, pa, pb, stroke);
        painter.text(
            pa + (pb - pa) * 0.5 + egui::vec2(0.0, -10.0),
            egui::Align2::CENTER_BOTTOM,
            format!("Ø{} × {}", format_number(pipe.parameters.diameter_mm), format_number(pipe.parameters.length_mm)),
            egui::FontId::proportional(11.0),
            egui::Color32::LIGHT_GRAY,
        );
    }

    for node in circuit.nodes() {
        let highlighted = editor.connect_source() == Some(node.handle);
        draw_node(&painter, node, to_screen(node.position), circuit.rules().icon_size(node.kind), highlighted);
    }

    let (origin, side) = editor.reset_button();
    let reset_rect = egui::Rect::from_min_size(to_screen(origin), egui::vec2(side as f32, side as f32));
    painter.rect_filled(reset_rect, 4.0, egui::Color32::from_gray(70));
    painter.text(
        reset_rect.center(),
        egui::Align2::CENTER_CENTER,
        "⟲",
        egui::FontId::proportional(side as f32 * 0.6),
        egui::Color32::WHITE,
    );

    reset_requested
}

fn draw_node(painter: &egui::Painter, node: &CircuitNode, center: egui::Pos2, icon: f64, highlighted: bool) {
    let half = icon as f32 / 2.0;
    let outline = if highlighted {
        egui::Stroke::new(3.0, SOURCE_COLOR)
    } else {
        egui::Stroke::new(1.5, egui::Color32::WHITE)
    };
    match node.kind {
        NodeKind::Pump => {
            painter.circle(center, half, egui::Color32::from_rgb(40, 140, 80), outline);
            painter.text(center, egui::Align2::CENTER_CENTER, "P", egui::FontId::proportional(half), egui::Color32::WHITE);
        }
        NodeKind::Component => {
            let rect = egui::Rect::from_center_size(center, egui::vec2(icon as f32, icon as f32 * 0.7));
            painter.rect(rect, 4.0, egui::Color32::from_rgb(60, 90, 150), outline);
        }
        kind => {
            let letter = match kind {
                NodeKind::TConnector => "T",
                NodeKind::YConnector => "Y",
                _ => "I",
            };
            painter.circle(center, half * 0.8, egui::Color32::from_gray(90), outline);
            painter.text(center, egui::Align2::CENTER_CENTER, letter, egui::FontId::proportional(half), egui::Color32::WHITE);
        }
    }
    painter.text(
        center + egui::vec2(0.0, half + 2.0),
        egui::Align2::CENTER_TOP,
        &node.display_name,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
}

fn draw_arrow_head(painter: &egui::Painter, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke) {
    let dir = (to - from).normalized();
    if !dir.x.is_finite() || !dir.y.is_finite() {
        return;
    }
    let tip = from + (to - from) * 0.55;
    let back = tip - dir * 10.0;
    let normal = egui::vec2(-dir.y, dir.x) * 5.0;
    painter.line_segment([tip, back + normal], stroke);
    painter.line_segment([tip, back - normal], stroke);
}

fn cursor_icon(shape: CursorShape) -> egui::CursorIcon {
    match shape {
        CursorShape::Default => egui::CursorIcon::Default,
        CursorShape::Grab => egui::CursorIcon::Grab,
        CursorShape::Grabbing => egui::CursorIcon::Grabbing,
        CursorShape::Crosshair => egui::CursorIcon::Crosshair,
        CursorShape::PointingHand => egui::CursorIcon::PointingHand,
        CursorShape::NotAllowed => egui::CursorIcon::NotAllowed,
    }
}

fn show_pipe_dialog(ctx: &egui::Context, editor: &mut CanvasEditor, bus: &mut wf_app::EventBus, catalog: &Catalog) {
    let Some(dialog) = editor.dialog_mut() else {
        return;
    };
    let title = match dialog.target {
        PipeTarget::New { .. } => "New pipe",
        PipeTarget::Edit(_) => "Edit pipe",
    };
    let mut confirm = false;
    let mut cancel = false;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            pipe_form(ui, dialog, catalog);
            if let Some(error) = &dialog.error {
                ui.colored_label(egui::Color32::from_rgb(220, 50, 50), error);
            }
            ui.horizontal(|ui| {
                confirm = ui.button("OK").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });

    if cancel {
        editor.cancel_dialog();
    } else if confirm {
        if let Err(err) = editor.confirm_dialog(bus) {
            debug!(error = %err, "pipe dialog not committed");
        }
    }
}

fn pipe_form(ui: &mut egui::Ui, dialog: &mut PipeDialog, catalog: &Catalog) {
    let form = &mut dialog.form;
    let mut lookup = false;
    egui::Grid::new("pipe_form").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
        ui.label("Pipe type");
        let before = form.pipe_type.clone();
        egui::ComboBox::from_id_salt("pipe_type")
            .selected_text(form.pipe_type.clone())
            .show_ui(ui, |ui| {
                for t in catalog.pipe_types() {
                    ui.selectable_value(&mut form.pipe_type, t.to_string(), t);
                }
            });
        lookup |= form.pipe_type != before;
        ui.end_row();

        ui.label("Diameter (mm)");
        ui.horizontal(|ui| {
            lookup |= ui.add(egui::TextEdit::singleline(&mut form.diameter).desired_width(80.0)).lost_focus();
            egui::ComboBox::from_id_salt("pipe_diameter")
                .width(40.0)
                .selected_text("")
                .show_ui(ui, |ui| {
                    for d in catalog.diameters_for(&form.pipe_type) {
                        if ui.selectable_label(false, format_number(d)).clicked() {
                            form.diameter = format_number(d);
                            lookup = true;
                        }
                    }
                });
        });
        ui.end_row();

        ui.label("Length (mm)");
        ui.text_edit_singleline(&mut form.length);
        ui.end_row();

        ui.label("Inclination");
        ui.horizontal(|ui| {
            ui.radio_value(&mut form.inclination, Inclination::Straight, "Straight");
            ui.radio_value(&mut form.inclination, Inclination::Bent, "Bent");
        });
        ui.end_row();

        if form.inclination == Inclination::Bent {
            ui.label("Bend radius (mm)");
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut form.bend_radius).desired_width(80.0));
                let radii = form
                    .diameter
                    .trim()
                    .parse::<f64>()
                    .map(|d| catalog.bend_radii_for(d))
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt("bend_radius")
                    .width(40.0)
                    .selected_text("")
                    .show_ui(ui, |ui| {
                        for r in radii {
                            if ui.selectable_label(false, format_number(r)).clicked() {
                                form.bend_radius = format_number(r);
                            }
                        }
                    });
            });
            ui.end_row();

            ui.label("Bend angle (°)");
            ui.text_edit_singleline(&mut form.bend_angle);
            ui.end_row();
        }

        ui.label("Reference");
        ui.text_edit_singleline(&mut form.pipe_ref);
        ui.end_row();

        ui.label("Supplier");
        ui.text_edit_singleline(&mut form.supplier);
        ui.end_row();
    });

    if lookup && !form.prefill_from_catalog(catalog) {
        debug!(pipe_type = %form.pipe_type, diameter = %form.diameter, "no catalog row for pipe");
    }
}

fn confirm_reset(ctx: &egui::Context, pump_name: &str) -> Option<bool> {
    let mut decision = None;
    egui::Window::new("Reset canvas")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Remove everything except the pump from the {pump_name} canvas?"));
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    decision = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    decision = Some(false);
                }
            });
        });
    decision
}
