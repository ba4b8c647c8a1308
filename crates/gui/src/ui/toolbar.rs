//! Tool selection and capture actions

use egui::Ui;

use crate::app::styles::MEASURE_ACCENT;
use crate::i18n::{t, tool_label};
use crate::measure::geometry::format_value;
use crate::measure::Tool;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    let has_model = state.model.is_some();

    ui.horizontal(|ui| {
        // ── Tools ──
        let active = state.session.active_tool();
        for &tool in Tool::all() {
            let enabled = has_model || tool == Tool::None;
            let button = egui::SelectableLabel::new(active == tool, tool_label(tool));
            if ui.add_enabled(enabled, button).clicked() {
                state.session.select_tool(tool);
            }
        }

        ui.separator();

        // ── Capture actions ──
        let session = &mut state.session;
        if ui
            .add_enabled(session.can_undo(), egui::Button::new(t("tb.undo")))
            .on_hover_text("Ctrl+Z")
            .clicked()
        {
            session.undo_last_point();
        }
        if session.active_tool() == Tool::Area
            && ui
                .add_enabled(
                    session.capture().points().len() >= 3,
                    egui::Button::new(t("tb.finish")),
                )
                .on_hover_text("Enter")
                .clicked()
        {
            session.finish_capture();
        }

        ui.separator();

        if ui
            .add_enabled(!session.store().is_empty(), egui::Button::new(t("tb.clear")))
            .clicked()
        {
            session.clear_all();
        }

        // Live value of the capture under the pointer
        if let (Some(value), Some(kind)) = (session.capture().preview_value(), session.active_tool().kind()) {
            ui.separator();
            ui.label(t("panel.preview"));
            ui.colored_label(MEASURE_ACCENT, format_value(value, kind.unit()));
        }
    });
}
