//! Per-frame projection of the visual registry into drawable primitives.
//!
//! Pure function of registry + camera + settings; holds no state.

use glam::{Quat, Vec3};

use crate::state::settings::MeasureSettings;

use super::visuals::{LineStyle, MarkerMaterial, Visual, VisualId, VisualRegistry};

/// The camera values labels need each frame
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub eye: Vec3,
    pub orientation: Quat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub id: VisualId,
    pub position: Vec3,
    pub radius: f32,
    pub material: MarkerMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub from: Vec3,
    pub to: Vec3,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillView {
    pub outline: Vec<Vec3>,
    pub preview: bool,
}

/// A camera-facing text sprite
#[derive(Debug, Clone, PartialEq)]
pub struct LabelView {
    pub anchor: Vec3,
    pub text: String,
    /// Copy of the camera orientation
    pub orientation: Quat,
    /// World-space scale keeping on-screen size roughly constant
    pub scale: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameView {
    pub markers: Vec<MarkerView>,
    pub lines: Vec<LineView>,
    pub fills: Vec<FillView>,
    pub labels: Vec<LabelView>,
}

/// Label scale for a camera distance, clamped below for legibility
pub fn label_scale(distance: f32, settings: &MeasureSettings) -> f32 {
    (distance * settings.label_scale_factor).max(settings.label_min_scale)
}

/// Visible renderables of the registry, with billboarded and scaled labels
pub fn project_frame(
    registry: &VisualRegistry,
    camera: CameraView,
    settings: &MeasureSettings,
) -> FrameView {
    let mut frame = FrameView::default();

    for (id, entry) in registry.iter() {
        if !entry.visible {
            continue;
        }
        match &entry.visual {
            Visual::Marker { position, material, .. } => frame.markers.push(MarkerView {
                id,
                position: position.as_vec3(),
                radius: settings.marker_radius,
                material: *material,
            }),
            Visual::Line { from, to, style } => frame.lines.push(LineView {
                from: from.as_vec3(),
                to: to.as_vec3(),
                style: *style,
            }),
            Visual::Fill { outline, preview } => frame.fills.push(FillView {
                outline: outline.iter().map(|p| p.as_vec3()).collect(),
                preview: *preview,
            }),
            Visual::Label { anchor, text } => {
                let anchor = anchor.as_vec3();
                frame.labels.push(LabelView {
                    anchor,
                    text: text.clone(),
                    orientation: camera.orientation,
                    scale: label_scale(camera.eye.distance(anchor), settings),
                });
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn camera_at(eye: Vec3) -> CameraView {
        CameraView {
            eye,
            orientation: Quat::from_rotation_y(0.3),
        }
    }

    #[test]
    fn test_label_scale_clamped() {
        let s = MeasureSettings::default();
        assert_eq!(label_scale(0.1, &s), s.label_min_scale);
        assert!((label_scale(100.0, &s) - 100.0 * s.label_scale_factor).abs() < 1e-5);
    }

    #[test]
    fn test_labels_follow_camera() {
        let mut reg = VisualRegistry::new();
        reg.spawn(Visual::label(DVec3::ZERO, "5.00 m"));
        let s = MeasureSettings::default();
        let near = project_frame(&reg, camera_at(Vec3::new(0.0, 0.0, 10.0)), &s);
        let far = project_frame(&reg, camera_at(Vec3::new(0.0, 0.0, 50.0)), &s);
        assert_eq!(near.labels[0].orientation, Quat::from_rotation_y(0.3));
        assert!(far.labels[0].scale > near.labels[0].scale);
    }

    #[test]
    fn test_hidden_visuals_skipped() {
        let mut reg = VisualRegistry::new();
        let line = reg.spawn(Visual::line(DVec3::ZERO, DVec3::X, LineStyle::Solid));
        reg.spawn(Visual::marker(DVec3::X, MarkerMaterial::Standard));
        reg.set_visible(line, false);
        let frame = project_frame(&reg, camera_at(Vec3::Z), &MeasureSettings::default());
        assert!(frame.lines.is_empty());
        assert_eq!(frame.markers.len(), 1);
    }
}
