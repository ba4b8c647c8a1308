use egui::Ui;

use crate::app::styles::notice_color;
use crate::i18n::t;
use crate::measure::{Notice, Tool};
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &AppState, notice: Option<&Notice>) {
    ui.horizontal(|ui| {
        match &state.model {
            Some(model) => ui.weak(format!(
                "{}: {} ({} {})",
                t("status.model"),
                model.name,
                model.triangles,
                t("status.triangles")
            )),
            None => ui.weak(t("status.no_model")),
        };

        ui.separator();
        ui.weak(format!("{} {}", state.session.store().len(), t("status.measurements")));
        ui.separator();

        let hint = if state.session.drag().is_dragging() {
            t("status.hint_drag")
        } else {
            match state.session.active_tool() {
                Tool::None => t("status.hint_none"),
                Tool::Length => t("status.hint_length"),
                Tool::Height => t("status.hint_height"),
                Tool::Area => t("status.hint_area"),
            }
        };
        ui.colored_label(egui::Color32::YELLOW, hint);

        if let Some(notice) = notice {
            ui.separator();
            ui.colored_label(notice_color(notice.level), &notice.text);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("Tapeline v", env!("CARGO_PKG_VERSION")));
        });
    });
}
