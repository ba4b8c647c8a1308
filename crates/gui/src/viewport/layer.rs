//! GPU-ready geometry of the measurement renderables

use glam::Vec3;

use crate::measure::view::FrameView;
use crate::measure::visuals::{LineStyle, MarkerMaterial};

use super::mesh::{sphere, FillMeshData, LineMeshData, MeshData};

const MARKER_RINGS: u32 = 8;
const MARKER_SECTORS: u32 = 12;

/// Area fill color; preview fills are fainter
const FILL_COLOR: [f32; 4] = [1.0, 0.77, 0.25, 0.28];
const FILL_PREVIEW_COLOR: [f32; 4] = [0.6, 0.8, 1.0, 0.18];

pub fn marker_color(material: MarkerMaterial) -> [f32; 3] {
    match material {
        MarkerMaterial::Standard => [0.95, 0.95, 0.92],
        MarkerMaterial::Editable => [1.0, 0.55, 0.1],
        MarkerMaterial::Hovered => [1.0, 0.25, 0.25],
        MarkerMaterial::Preview => [0.55, 0.75, 1.0],
    }
}

pub fn line_color(style: LineStyle) -> [f32; 4] {
    match style {
        LineStyle::Solid => [1.0, 0.77, 0.25, 1.0],
        LineStyle::Preview => [0.6, 0.8, 1.0, 0.85],
        LineStyle::Closing => [0.6, 0.8, 1.0, 0.45],
    }
}

/// Markers, lines and fills of one frame, merged per draw call
#[derive(Debug, Default)]
pub struct MeasureLayer {
    pub markers: MeshData,
    pub lines: LineMeshData,
    pub fills: FillMeshData,
}

impl MeasureLayer {
    pub fn from_frame(frame: &FrameView) -> Self {
        let mut layer = Self::default();

        for marker in &frame.markers {
            let ball = sphere(marker.radius, MARKER_RINGS, MARKER_SECTORS, marker_color(marker.material));
            layer.markers.append(&ball.translated(marker.position));
        }
        for line in &frame.lines {
            layer.lines.push_segment(line.from, line.to, line_color(line.style));
        }
        for fill in &frame.fills {
            let color = if fill.preview { FILL_PREVIEW_COLOR } else { FILL_COLOR };
            // Lift slightly off the surface to avoid z-fighting
            let outline: Vec<Vec3> = fill.outline.iter().map(|p| *p + Vec3::Y * 0.005).collect();
            layer.fills.push_fan(&outline, color);
        }

        layer
    }
}
