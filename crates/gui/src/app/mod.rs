//! Main application module

mod keyboard;
mod menus;
pub mod styles;

use eframe::egui;

use crate::i18n::t;
use crate::measure::Notice;
use crate::model::LoadedModel;
use crate::state::cloud::{CloudSync, SyncEvent};
use crate::state::AppState;
use crate::ui::measurements::MeasurementsPanel;
use crate::ui::{status_bar, toolbar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct TapelineApp {
    state: AppState,
    viewport: ViewportPanel,
    measurements_panel: MeasurementsPanel,
    /// None when the sync client could not start
    cloud: Option<CloudSync>,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
    /// Toast shown in the status bar until the expiry time (seconds)
    notice: Option<(Notice, f64)>,
}

impl TapelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_model: Option<LoadedModel>) -> Self {
        let mut state = AppState::default();

        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let mut viewport = ViewportPanel::new();

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let model = initial_model.unwrap_or_else(crate::model::demo_site);
        menus::install_model(&mut state, &mut viewport, model);

        let cloud = match CloudSync::new(&state.settings.cloud.server_url) {
            Ok(cloud) => Some(cloud),
            Err(e) => {
                tracing::warn!("Cloud sync disabled: {}", e);
                None
            }
        };

        let last_font_size = state.settings.ui.font_size;

        Self {
            state,
            viewport,
            measurements_panel: MeasurementsPanel::default(),
            cloud,
            last_font_size,
            notice: None,
        }
    }

    /// Turn finished sync operations into state changes and notices
    fn handle_cloud_events(&mut self) {
        let Some(cloud) = self.cloud.as_mut() else {
            return;
        };
        for event in cloud.poll() {
            match event {
                SyncEvent::Pushed { project } => {
                    self.state.settings.cloud.project_id = Some(project.id.clone());
                    self.state.settings.save();
                    self.state.session.notify(Notice::info(format!(
                        "{} ({})",
                        t("notice.cloud_pushed"),
                        project.measurement_count
                    )));
                }
                SyncEvent::Pulled { snapshot, .. } => {
                    let restored = self.state.session.restore(&snapshot);
                    self.state
                        .session
                        .notify(Notice::info(format!("{} ({})", t("notice.cloud_pulled"), restored)));
                }
                SyncEvent::Failed(e) => {
                    self.state
                        .session
                        .notify(Notice::error(format!("{}: {}", t("notice.cloud_failed"), e)));
                }
            }
        }
    }

    /// Move the newest session notice into the toast slot
    fn update_notice(&mut self, now: f64) {
        let ttl = self.state.settings.ui.notice_seconds as f64;
        for notice in self.state.session.take_notices() {
            tracing::info!(level = ?notice.level, "{}", notice.text);
            self.notice = Some((notice, now + ttl));
        }
        if self.notice.as_ref().is_some_and(|(_, expiry)| *expiry <= now) {
            self.notice = None;
        }
    }
}

impl eframe::App for TapelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        self.handle_cloud_events();
        if self.cloud.as_ref().is_some_and(|c| c.is_busy()) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let now = ctx.input(|i| i.time);
        self.update_notice(now);
        if let Some((_, expiry)) = &self.notice {
            ctx.request_repaint_after(std::time::Duration::from_secs_f64((expiry - now).max(0.0)));
        }

        self.state.autosave();

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state, &mut self.viewport);
                menus::edit_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
                menus::cloud_menu(ui, &mut self.state, self.cloud.as_mut());
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Toolbar ───────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                toolbar::show(ui, &mut self.state);
            });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state, self.notice.as_ref().map(|(n, _)| n));
            });

        // ── Right panel: Measurements ────────────────────────
        if self.state.panels.measurements {
            egui::SidePanel::right("measurements")
                .default_width(320.0)
                .width_range(240.0..=560.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    self.measurements_panel.show(ui, &mut self.state);
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });
    }
}
