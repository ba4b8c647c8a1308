//! Measurement list panel: values, visibility, edit mode, descriptions and points

use egui::Ui;
use egui_extras::{Column, TableBuilder};
use shared::MeasurementId;

use crate::app::styles::MEASURE_ACCENT;
use crate::i18n::{kind_label, t, tool_label};
use crate::measure::geometry::format_value;
use crate::measure::MeasurementRow;
use crate::state::AppState;

/// Deferred change requested from inside the table
enum RowAction {
    Select(MeasurementId),
    ToggleVisibility(MeasurementId),
    ToggleEditMode(MeasurementId),
    Delete(MeasurementId),
}

/// Panel state that outlives a frame: selection and the description being typed
#[derive(Default)]
pub struct MeasurementsPanel {
    selected: Option<MeasurementId>,
    description: String,
}

impl MeasurementsPanel {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        ui.heading(t("panel.measurements"));
        ui.separator();

        self.show_capture(ui, state);

        let rows = state.session.rows();
        if rows.is_empty() {
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                ui.weak(t("panel.empty"));
            });
            return;
        }

        // Forget a selection whose measurement is gone
        if let Some(id) = &self.selected {
            if !rows.iter().any(|r| &r.id == id) {
                self.selected = None;
            }
        }

        let actions = self.show_table(ui, &rows);
        for action in actions {
            match action {
                RowAction::Select(id) => {
                    self.description = state
                        .session
                        .store()
                        .get(&id)
                        .and_then(|m| m.description.clone())
                        .unwrap_or_default();
                    self.selected = Some(id);
                }
                RowAction::ToggleVisibility(id) => {
                    state.session.toggle_visibility(&id);
                }
                RowAction::ToggleEditMode(id) => {
                    state.session.toggle_edit_mode(&id);
                }
                RowAction::Delete(id) => {
                    state.session.delete_measurement(&id);
                }
            }
        }

        if let Some(id) = self.selected.clone() {
            ui.add_space(6.0);
            ui.separator();
            self.show_details(ui, state, &id);
        }
    }

    /// Points of the capture in progress, each removable
    fn show_capture(&mut self, ui: &mut Ui, state: &mut AppState) {
        let session = &mut state.session;
        if !session.capture().is_capturing() {
            return;
        }
        let tool = session.active_tool();
        egui::CollapsingHeader::new(format!("{}: {}", t("panel.capture"), tool_label(tool)))
            .id_salt("capture_points")
            .default_open(true)
            .show(ui, |ui| {
                let mut remove = None;
                for (i, point) in session.capture().points().iter().enumerate() {
                    ui.horizontal(|ui| {
                        let p = point.position;
                        ui.monospace(format!("{}: {:.2}, {:.2}, {:.2}", i + 1, p.x, p.y, p.z));
                        if ui.small_button("x").on_hover_text(t("panel.delete_point")).clicked() {
                            remove = Some(i);
                        }
                    });
                }
                if let Some(i) = remove {
                    session.remove_capture_point(i);
                }
                if let (Some(value), Some(kind)) = (session.capture().preview_value(), tool.kind()) {
                    ui.horizontal(|ui| {
                        ui.label(t("panel.preview"));
                        ui.colored_label(MEASURE_ACCENT, format_value(value, kind.unit()));
                    });
                }
            });
        ui.add_space(4.0);
    }

    fn show_table(&self, ui: &mut Ui, rows: &[MeasurementRow]) -> Vec<RowAction> {
        let mut actions = Vec::new();
        let row_height = ui.text_style_height(&egui::TextStyle::Body) + 6.0;

        TableBuilder::new(ui)
            .id_salt("measurements_table")
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(70.0))
            .column(Column::remainder().at_least(80.0))
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .max_scroll_height(320.0)
            .header(row_height, |mut header| {
                header.col(|ui| {
                    ui.strong(t("panel.measurements"));
                });
                header.col(|ui| {
                    ui.strong(t("panel.value"));
                });
                header.col(|ui| {
                    ui.strong("👁").on_hover_text(t("panel.visible"));
                });
                header.col(|ui| {
                    ui.strong("✏").on_hover_text(t("panel.edit_points"));
                });
                header.col(|_| {});
            })
            .body(|mut body| {
                for row in rows {
                    body.row(row_height, |mut table_row| {
                        let selected = self.selected.as_ref() == Some(&row.id);
                        table_row.set_selected(selected);

                        table_row.col(|ui| {
                            let title = row
                                .description
                                .clone()
                                .unwrap_or_else(|| kind_label(row.kind).to_string());
                            if ui.selectable_label(selected, title).clicked() {
                                actions.push(RowAction::Select(row.id.clone()));
                            }
                        });
                        table_row.col(|ui| {
                            ui.colored_label(MEASURE_ACCENT, &row.value_text);
                            if let Some(incline) = &row.inclination_text {
                                ui.weak(format!("∠ {incline}"))
                                    .on_hover_text(t("panel.incline"));
                            }
                        });
                        table_row.col(|ui| {
                            let mut visible = row.visible;
                            if ui.checkbox(&mut visible, "").changed() {
                                actions.push(RowAction::ToggleVisibility(row.id.clone()));
                            }
                        });
                        table_row.col(|ui| {
                            let mut edit_mode = row.edit_mode;
                            if ui.checkbox(&mut edit_mode, "").changed() {
                                actions.push(RowAction::ToggleEditMode(row.id.clone()));
                            }
                        });
                        table_row.col(|ui| {
                            if ui.small_button("🗑").on_hover_text(t("panel.delete")).clicked() {
                                actions.push(RowAction::Delete(row.id.clone()));
                            }
                        });
                    });
                }
            });

        actions
    }

    /// Description editor and point list of the selected measurement
    fn show_details(&mut self, ui: &mut Ui, state: &mut AppState, id: &str) {
        let Some(measurement) = state.session.store().get(id) else {
            return;
        };
        let kind = measurement.kind;
        let points: Vec<_> = measurement.points().iter().map(|p| p.position).collect();

        ui.horizontal(|ui| {
            ui.strong(kind_label(kind));
            ui.colored_label(MEASURE_ACCENT, format_value(measurement.value(), measurement.unit()));
        });

        ui.label(t("panel.description"));
        let current = measurement.description.clone().unwrap_or_default();
        // Committed on Enter or focus loss
        if ui.text_edit_singleline(&mut self.description).lost_focus()
            && self.description.trim() != current
        {
            state.session.update_description(id, &self.description);
        }

        ui.add_space(4.0);
        ui.label(format!("{} ({})", t("panel.points"), points.len()));
        let mut delete = None;
        egui::Grid::new("selected_points")
            .num_columns(2)
            .spacing([8.0, 2.0])
            .show(ui, |ui| {
                for (i, p) in points.iter().enumerate() {
                    ui.monospace(format!("{}: {:.2}, {:.2}, {:.2}", i + 1, p.x, p.y, p.z));
                    if ui.small_button("x").on_hover_text(t("panel.delete_point")).clicked() {
                        delete = Some(i);
                    }
                    ui.end_row();
                }
            });
        if let Some(i) = delete {
            state.session.delete_single_point(id, i);
        }
    }
}
