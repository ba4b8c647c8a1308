//! Application menu bar and settings window

use std::path::Path;

use eframe::egui;

use crate::export;
use crate::i18n::{lang, set_lang, t, Lang};
use crate::measure::{Notice, Tool};
use crate::model::{self, LoadedModel};
use crate::persistence;
use crate::state::cloud::CloudSync;
use crate::state::settings::AppSettings;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Install a model and frame the camera on it
pub fn install_model(state: &mut AppState, viewport: &mut ViewportPanel, model: LoadedModel) {
    let name = model.name.clone();
    state.load_model(model);
    if let Some(bounds) = state.session.picking().model_bounds() {
        viewport.frame(&bounds);
    }
    state
        .session
        .notify(Notice::info(format!("{}: {}", t("notice.model_loaded"), name)));
}

/// Load an OBJ file, reporting failures as a notice
pub fn open_model(state: &mut AppState, viewport: &mut ViewportPanel, path: &Path) {
    match model::load_obj(path) {
        Ok(model) => install_model(state, viewport, model),
        Err(e) => {
            tracing::error!("Failed to load model {}: {e}", path.display());
            state
                .session
                .notify(Notice::error(format!("{}: {e}", t("notice.model_failed"))));
        }
    }
}

fn report_io<E: std::fmt::Display>(state: &mut AppState, result: Result<(), E>, done_key: &str, path: &Path) {
    match result {
        Ok(()) => {
            tracing::info!("{} {}", t(done_key), path.display());
            state.session.notify(Notice::info(t(done_key)));
        }
        Err(e) => {
            tracing::error!("{}: {e}", path.display());
            state
                .session
                .notify(Notice::error(format!("{}: {e}", t("notice.io_failed"))));
        }
    }
}

fn default_file_stem(state: &AppState) -> String {
    state
        .session
        .model_name()
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "measurements".to_string())
}

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button(t("menu.file"), |ui| {
        if ui.button(t("menu.open_model")).clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title(t("menu.open_model_title"))
                .add_filter("Wavefront OBJ", &["obj"])
                .pick_file()
            {
                open_model(state, viewport, &path);
            }
        }
        if ui.button(t("menu.demo_site")).clicked() {
            ui.close_menu();
            install_model(state, viewport, model::demo_site());
        }
        ui.separator();

        let has_model = state.model.is_some();
        if ui
            .add_enabled(has_model, egui::Button::new(t("menu.save_measurements")))
            .clicked()
        {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title(t("menu.measurements_title"))
                .add_filter("JSON", &["json"])
                .set_file_name(format!("{}.measurements.json", default_file_stem(state)))
                .save_file()
            {
                let result = persistence::save_snapshot(&state.session.snapshot(), &path);
                report_io(state, result, "notice.saved", &path);
            }
        }
        if ui
            .add_enabled(has_model, egui::Button::new(t("menu.load_measurements")))
            .clicked()
        {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title(t("menu.measurements_title"))
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                let result = persistence::load_snapshot(&path).map(|snapshot| {
                    state.session.restore(&snapshot);
                });
                report_io(state, result, "notice.loaded", &path);
            }
        }
        if ui
            .add_enabled(
                !state.session.store().is_empty(),
                egui::Button::new(t("menu.export_report")),
            )
            .clicked()
        {
            ui.close_menu();
            let stem = default_file_stem(state);
            if let Some(path) = rfd::FileDialog::new()
                .set_title(t("menu.export_report_title"))
                .add_filter("JSON", &["json"])
                .set_file_name(format!("{stem}.report.json"))
                .save_file()
            {
                let report = state.session.export_report(&stem);
                let result = export::save_report(&report, &path);
                report_io(state, result, "notice.exported", &path);
            }
        }
        ui.separator();
        if ui.button(t("menu.quit")).clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the edit menu
pub fn edit_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button(t("menu.edit"), |ui| {
        let session = &mut state.session;
        if ui
            .add_enabled(session.can_undo(), egui::Button::new(t("menu.undo_point")))
            .clicked()
        {
            session.undo_last_point();
            ui.close_menu();
        }
        let area_open = session.active_tool() == Tool::Area && session.capture().points().len() >= 3;
        if ui
            .add_enabled(area_open, egui::Button::new(t("menu.finish_area")))
            .clicked()
        {
            session.finish_capture();
            ui.close_menu();
        }
        if ui
            .add_enabled(
                session.capture().is_capturing(),
                egui::Button::new(t("menu.cancel_capture")),
            )
            .clicked()
        {
            session.cancel_capture();
            ui.close_menu();
        }
        ui.separator();
        if ui
            .add_enabled(!session.store().is_empty(), egui::Button::new(t("menu.clear_all")))
            .clicked()
        {
            session.clear_all();
            ui.close_menu();
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button(t("menu.view"), |ui| {
        ui.checkbox(&mut state.panels.measurements, t("menu.measurements_panel"));
        ui.separator();
        if ui.button(t("menu.reset_camera")).clicked() {
            match state.session.picking().model_bounds() {
                Some(bounds) => viewport.frame(&bounds),
                None => viewport.reset_camera(),
            }
            ui.close_menu();
        }
        ui.separator();
        ui.menu_button(t("menu.language"), |ui| {
            if ui.selectable_label(lang() == Lang::Ru, "Русский").clicked() {
                set_lang(Lang::Ru);
                ui.close_menu();
            }
            if ui.selectable_label(lang() == Lang::En, "English").clicked() {
                set_lang(Lang::En);
                ui.close_menu();
            }
        });
    });
}

/// Show the cloud menu; disabled when the sync client could not start
pub fn cloud_menu(ui: &mut egui::Ui, state: &mut AppState, cloud: Option<&mut CloudSync>) {
    ui.menu_button(t("menu.cloud"), |ui| {
        let Some(cloud) = cloud else {
            ui.label(t("notice.cloud_failed"));
            return;
        };
        let idle = !cloud.is_busy() && state.model.is_some();
        if ui
            .add_enabled(idle, egui::Button::new(t("menu.cloud_push")))
            .clicked()
        {
            cloud.set_base_url(&state.settings.cloud.server_url);
            cloud.push(
                state.settings.cloud.project_id.clone(),
                default_file_stem(state),
                state.session.snapshot(),
            );
            ui.close_menu();
        }
        let can_pull = idle && state.settings.cloud.project_id.is_some();
        if ui
            .add_enabled(can_pull, egui::Button::new(t("menu.cloud_pull")))
            .clicked()
        {
            cloud.set_base_url(&state.settings.cloud.server_url);
            cloud.pull(state.settings.cloud.project_id.clone());
            ui.close_menu();
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button(t("menu.settings"), |ui| {
        if ui.button(t("menu.preferences")).clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let was_open = state.show_settings_window;
    let mut open = was_open;
    egui::Window::new(t("settings.title"))
        .open(&mut open)
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_measure_settings(ui, state);
                show_grid_settings(ui, state);
                show_axes_settings(ui, state);
                show_viewport_settings(ui, state);
                show_cloud_settings(ui, state);
                show_ui_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    // The close button clears the flag from inside the window
    state.show_settings_window &= open;
    if was_open && !state.show_settings_window {
        state.settings.save();
    }
    state.apply_measure_settings();
}

fn show_measure_settings(ui: &mut egui::Ui, state: &mut AppState) {
    let measure = &mut state.settings.measure;
    ui.heading(t("settings.measure"));
    ui.horizontal(|ui| {
        ui.label(t("settings.close_threshold"));
        ui.add(
            egui::DragValue::new(&mut measure.close_threshold)
                .speed(0.01)
                .range(0.01..=5.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.incline_threshold"));
        ui.add(
            egui::DragValue::new(&mut measure.inclination_threshold)
                .speed(0.1)
                .range(0.0..=90.0)
                .suffix("°"),
        );
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.marker_radius"));
        ui.add(
            egui::DragValue::new(&mut measure.marker_radius)
                .speed(0.005)
                .range(0.01..=1.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.label_scale"));
        ui.add(egui::Slider::new(&mut measure.label_scale_factor, 0.01..=0.3));
    });
    ui.add_space(10.0);
}

fn show_grid_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.grid"));
    ui.checkbox(&mut state.settings.grid.visible, t("settings.grid_visible"));

    ui.horizontal(|ui| {
        ui.label(t("settings.grid_size"));
        ui.add(
            egui::DragValue::new(&mut state.settings.grid.size)
                .speed(0.1)
                .range(0.1..=100.0)
                .suffix(" m"),
        );
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.grid_range"));
        ui.add(
            egui::DragValue::new(&mut state.settings.grid.range)
                .speed(1)
                .range(1..=100),
        );
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.grid_opacity"));
        ui.add(egui::Slider::new(&mut state.settings.grid.opacity, 0.0..=1.0));
    });
    ui.add_space(10.0);
}

fn show_axes_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.axes"));
    ui.checkbox(&mut state.settings.axes.visible, t("settings.axes_visible"));
    ui.checkbox(&mut state.settings.axes.show_labels, t("settings.axes_labels"));

    ui.horizontal(|ui| {
        ui.label(t("settings.axes_length"));
        ui.add(
            egui::DragValue::new(&mut state.settings.axes.length)
                .speed(0.1)
                .range(0.1..=20.0),
        );
    });
    ui.add_space(10.0);
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.viewport"));
    ui.horizontal(|ui| {
        ui.label(t("settings.bg_color"));
        let [r, g, b] = state.settings.viewport.background_color;
        let mut color = egui::Color32::from_rgb(r, g, b);
        if ui.color_edit_button_srgba(&mut color).changed() {
            state.settings.viewport.background_color = [color.r(), color.g(), color.b()];
        }
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.orbit_speed"));
        ui.add(egui::Slider::new(&mut state.settings.viewport.orbit_speed, 0.05..=2.0));
    });
    ui.add_space(10.0);
}

fn show_cloud_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.cloud"));
    ui.horizontal(|ui| {
        ui.label(t("settings.server_url"));
        ui.text_edit_singleline(&mut state.settings.cloud.server_url);
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.project_id"));
        let mut project = state.settings.cloud.project_id.clone().unwrap_or_default();
        if ui.text_edit_singleline(&mut project).changed() {
            let project = project.trim();
            state.settings.cloud.project_id = (!project.is_empty()).then(|| project.to_string());
        }
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.ui"));
    ui.horizontal(|ui| {
        ui.label(t("settings.font_size"));
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button(t("settings.reset")).clicked() {
            state.settings = AppSettings::default();
        }
        if ui.button(t("settings.close")).clicked() {
            state.show_settings_window = false;
        }
    });
}
