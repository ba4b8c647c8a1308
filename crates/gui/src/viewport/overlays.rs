//! Viewport overlay drawing (axis labels, measurement labels, hints)

use egui::Painter;

use crate::app::styles::MEASURE_ACCENT;
use crate::measure::view::LabelView;

use super::camera::ArcBallCamera;

/// World height of a label at scale 1.0
const LABEL_WORLD_HEIGHT: f32 = 0.25;
const LABEL_MIN_PX: f32 = 9.0;
const LABEL_MAX_PX: f32 = 48.0;

/// Draw axis labels in the viewport
pub fn draw_axis_labels(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera, length: f32) {
    let tip = length * 1.05;
    let labels = [
        ([tip, 0.0, 0.0], "X", egui::Color32::from_rgb(220, 70, 70)),
        ([0.0, tip, 0.0], "Y", egui::Color32::from_rgb(70, 200, 70)),
        ([0.0, 0.0, tip], "Z", egui::Color32::from_rgb(70, 110, 220)),
    ];

    for (pos, label, color) in &labels {
        if let Some(screen) = camera.project((*pos).into(), rect) {
            if rect.contains(screen) {
                painter.text(
                    screen,
                    egui::Align2::LEFT_BOTTOM,
                    *label,
                    egui::FontId::monospace(12.0),
                    *color,
                );
            }
        }
    }
}

/// Pixel height of a billboard label of world scale `scale` seen from `distance`
pub fn label_pixel_size(scale: f32, distance: f32, fov: f32, viewport_height: f32) -> f32 {
    if distance <= f32::EPSILON {
        return LABEL_MAX_PX;
    }
    let world = scale * LABEL_WORLD_HEIGHT;
    let px = world * viewport_height / (2.0 * distance * (fov * 0.5).tan());
    px.clamp(LABEL_MIN_PX, LABEL_MAX_PX)
}

/// Measurement value labels, on a dark plate, centred on their anchors
pub fn draw_measure_labels(
    painter: &Painter,
    rect: egui::Rect,
    camera: &ArcBallCamera,
    labels: &[LabelView],
) {
    let eye = camera.eye_position();
    for label in labels {
        let Some(screen) = camera.project(label.anchor, rect) else {
            continue;
        };
        if !rect.contains(screen) {
            continue;
        }
        let size = label_pixel_size(label.scale, eye.distance(label.anchor), camera.fov, rect.height());
        let galley = painter.layout_no_wrap(
            label.text.clone(),
            egui::FontId::proportional(size),
            MEASURE_ACCENT,
        );
        let text_rect = egui::Align2::CENTER_BOTTOM.anchor_size(screen - egui::vec2(0.0, 6.0), galley.size());
        painter.rect_filled(
            text_rect.expand(3.0),
            3.0,
            egui::Color32::from_rgba_premultiplied(0, 0, 0, 170),
        );
        painter.galley(text_rect.min, galley, MEASURE_ACCENT);
    }
}

/// Centred hint near the bottom of the viewport
pub fn draw_hint(painter: &Painter, rect: egui::Rect, text: &str) {
    painter.text(
        egui::pos2(rect.center().x, rect.bottom() - 20.0),
        egui::Align2::CENTER_BOTTOM,
        text,
        egui::FontId::proportional(12.0),
        egui::Color32::from_rgb(120, 120, 130),
    );
}
