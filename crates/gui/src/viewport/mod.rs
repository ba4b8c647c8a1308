//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
mod layer;
mod overlays;
pub use tapeline_gui_lib::viewport::{camera, mesh, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::i18n::t;
use crate::measure::{project_frame, CameraView, CursorIntent, FrameView};
use crate::state::AppState;
use camera::ArcBallCamera;
use gl_renderer::{GlRenderer, LayerKey};
use layer::MeasureLayer;
use mesh::MeshData;
use picking::Aabb;

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    camera: ArcBallCamera,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Last pointer position fed to the session
    last_pointer: Option<egui::Pos2>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            gl_renderer: None,
            last_pointer: None,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("GL renderer unavailable: {e}"),
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
    }

    /// Point the camera at a model so it fills the view
    pub fn frame(&mut self, bounds: &Aabb) {
        self.camera.frame(bounds);
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        // ── Measurement pointer handling ──────────────────────────
        self.handle_pointer(ui, &response, rect, state);

        // ── Camera controls ───────────────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary) && state.session.orbit_enabled() {
            let delta = response.drag_delta();
            let speed = state.settings.viewport.orbit_speed;
            self.camera.rotate(delta.x * speed, delta.y * speed);
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            let k = self.camera.distance * 0.0015;
            self.camera.pan(-delta.x * k, delta.y * k);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.zoom(scroll * 0.01);
            }
        }

        if response.hovered() || state.session.drag().is_dragging() {
            let icon = match state.session.cursor_intent() {
                CursorIntent::Default => egui::CursorIcon::Default,
                CursorIntent::Pointer => egui::CursorIcon::Crosshair,
                CursorIntent::Grab => egui::CursorIcon::Grab,
                CursorIntent::Grabbing => egui::CursorIcon::Grabbing,
            };
            ui.ctx().set_cursor_icon(icon);
        }

        // ── Rendering ─────────────────────────────────────────────
        let frame = project_frame(
            state.session.registry(),
            CameraView {
                eye: self.camera.eye_position(),
                orientation: self.camera.orientation(),
            },
            state.session.settings(),
        );
        self.render_gl(ui, rect, state, &frame);
        self.draw_overlays(ui, rect, state, &frame);
    }

    /// Feed hover, press, release and click to the measurement session
    fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        rect: egui::Rect,
        state: &mut AppState,
    ) {
        let session = &mut state.session;
        let pos = response.interact_pointer_pos().or_else(|| response.hover_pos());

        match pos {
            Some(pos) if self.last_pointer != Some(pos) => {
                session.pointer_moved(&self.camera.screen_ray(pos, rect));
                self.last_pointer = Some(pos);
            }
            Some(_) => {}
            None => {
                if self.last_pointer.take().is_some() {
                    session.pointer_left();
                }
            }
        }

        let (pressed, released, primary_down, focused) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.focused,
            )
        });
        if pressed && response.hovered() {
            if let Some(pos) = pos {
                if session.pointer_pressed(&self.camera.screen_ray(pos, rect)) {
                    tracing::debug!("marker drag started");
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(id) = session.clicked(&self.camera.screen_ray(pos, rect)) {
                    tracing::info!(id = %id, "measurement completed");
                }
            }
        }

        if session.drag().is_dragging() && drag_ended(released, primary_down, focused) {
            session.pointer_released();
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, state: &AppState, frame: &FrameView) {
        let Some(gl_renderer) = &self.gl_renderer else {
            overlays::draw_hint(&ui.painter_at(rect), rect, t("viewport.no_gl"));
            return;
        };

        let session = &state.session;
        let revision = state.model_revision;
        let layer_key: LayerKey = (
            session.registry().version(),
            session.settings().marker_radius.to_bits(),
        );

        // Only copy geometry across when the GPU side is out of date
        let (model, layer) = match gl_renderer.lock() {
            Ok(r) => {
                let model: Option<Option<MeshData>> = r
                    .needs_model(revision)
                    .then(|| session.picking().model_mesh().cloned());
                let layer = r.layer_stale(layer_key).then(|| MeasureLayer::from_frame(frame));
                (model, layer)
            }
            Err(_) => return,
        };

        let renderer = gl_renderer.clone();
        let camera = self.camera.clone();
        let grid_settings = state.settings.grid.clone();
        let axes_settings = state.settings.axes.clone();
        let bg_color = state.settings.viewport.background_color;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer.lock() {
                    r.update_grid(gl, &grid_settings);
                    r.update_axes(gl, &axes_settings);
                    if let Some(model) = &model {
                        r.sync_model(gl, model.as_ref(), revision);
                    }
                    if let Some(layer) = &layer {
                        r.sync_layer(gl, layer, layer_key);
                    }

                    let render_params = gl_renderer::RenderParams {
                        viewport,
                        grid_visible: grid_settings.visible,
                        axes_visible: axes_settings.visible,
                        bg_color,
                    };
                    r.paint(gl, &camera, &render_params);
                }
            })),
        };

        ui.painter().add(callback);
    }

    fn draw_overlays(&self, ui: &mut Ui, rect: egui::Rect, state: &AppState, frame: &FrameView) {
        let painter = ui.painter_at(rect);

        if state.settings.axes.visible && state.settings.axes.show_labels {
            overlays::draw_axis_labels(&painter, rect, &self.camera, state.settings.axes.length);
        }

        overlays::draw_measure_labels(&painter, rect, &self.camera, &frame.labels);

        if state.model.is_none() {
            overlays::draw_hint(&painter, rect, t("viewport.no_model"));
        }
    }
}

/// A drag also ends when the release was never delivered (focus loss)
fn drag_ended(released: bool, primary_down: bool, focused: bool) -> bool {
    released || !primary_down || !focused
}

impl Default for ViewportPanel {
    fn default() -> Self {
        Self::new()
    }
}
