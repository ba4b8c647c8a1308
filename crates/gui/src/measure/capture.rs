//! In-progress (temporary) capture for the active tool.
//!
//! `Idle` is `tool == Tool::None` with no points. Any other tool is
//! `Capturing` with `0..k` points. Finalize and cancel both return to `Idle`.

use glam::DVec3;
use tracing::debug;

use super::geometry;
use super::types::{MeasurementKind, MeasurementPoint, Tool};
use super::visuals::{LineStyle, MarkerMaterial, Visual, VisualId, VisualRegistry};

/// Visuals that belong to one captured point
#[derive(Debug, Clone, Copy, PartialEq)]
struct TempPointVisuals {
    marker: VisualId,
    /// Segment from the previous point, with its partial length label
    segment: Option<(VisualId, VisualId)>,
}

/// Non-committed preview towards the hover point
#[derive(Debug, Default)]
struct HoverPreview {
    lines: Vec<VisualId>,
    fill: Option<VisualId>,
    label: Option<VisualId>,
    value: Option<f64>,
}

/// Result of feeding a picked point into the capture
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// No tool active
    Ignored,
    Appended { index: usize },
    /// Capture finished; the caller creates the measurement
    Completed {
        kind: MeasurementKind,
        points: Vec<MeasurementPoint>,
    },
}

#[derive(Debug)]
pub struct CaptureState {
    tool: Tool,
    points: Vec<MeasurementPoint>,
    visuals: Vec<TempPointVisuals>,
    hover: HoverPreview,
    close_threshold: f64,
    inclination_threshold: f64,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new(
            geometry::DEFAULT_CLOSE_THRESHOLD,
            geometry::DEFAULT_INCLINATION_THRESHOLD,
        )
    }
}

impl CaptureState {
    pub fn new(close_threshold: f64, inclination_threshold: f64) -> Self {
        Self {
            tool: Tool::None,
            points: Vec::new(),
            visuals: Vec::new(),
            hover: HoverPreview::default(),
            close_threshold,
            inclination_threshold,
        }
    }

    pub fn set_thresholds(&mut self, close_threshold: f64, inclination_threshold: f64) {
        self.close_threshold = close_threshold;
        self.inclination_threshold = inclination_threshold;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn is_capturing(&self) -> bool {
        self.tool != Tool::None
    }

    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn can_undo(&self) -> bool {
        !self.points.is_empty()
    }

    /// Live value of the tentative measurement under the cursor
    pub fn preview_value(&self) -> Option<f64> {
        self.hover.value
    }

    /// Every renderable currently owned by the capture
    pub fn visual_ids(&self) -> Vec<VisualId> {
        let mut ids = Vec::new();
        for v in &self.visuals {
            ids.push(v.marker);
            if let Some((line, label)) = v.segment {
                ids.push(line);
                ids.push(label);
            }
        }
        ids.extend(self.hover.lines.iter().copied());
        ids.extend(self.hover.fill);
        ids.extend(self.hover.label);
        ids
    }

    /// Switch tools. Any in-progress points are discarded without a measurement.
    pub fn select_tool(&mut self, tool: Tool, registry: &mut VisualRegistry) {
        if !self.points.is_empty() {
            debug!(
                "Discarding {} captured point(s) on tool switch",
                self.points.len()
            );
        }
        self.discard(registry);
        self.tool = tool;
        debug!("Active tool: {:?}", tool);
    }

    /// Drop all points and return to idle
    pub fn cancel(&mut self, registry: &mut VisualRegistry) {
        self.discard(registry);
        self.tool = Tool::None;
    }

    fn discard(&mut self, registry: &mut VisualRegistry) {
        self.clear_hover(registry);
        for v in self.visuals.drain(..) {
            dispose_point_visuals(v, registry);
        }
        self.points.clear();
    }

    /// Feed a surface pick into the capture
    pub fn add_point(&mut self, position: DVec3, registry: &mut VisualRegistry) -> CaptureOutcome {
        let Some(kind) = self.tool.kind() else {
            return CaptureOutcome::Ignored;
        };

        if kind == MeasurementKind::Area && self.closes_polygon(position) {
            debug!("Area closed at first point with {} points", self.points.len());
            return self.complete(kind, registry);
        }

        self.clear_hover(registry);
        self.points.push(MeasurementPoint::new(position));
        let index = self.points.len() - 1;
        let visuals = self.spawn_point_visuals(index, registry);
        self.visuals.push(visuals);
        debug!("Captured point {} at {:?}", index, position);

        if self.tool.required_points() == Some(self.points.len()) {
            return self.complete(kind, registry);
        }

        CaptureOutcome::Appended { index }
    }

    fn closes_polygon(&self, position: DVec3) -> bool {
        match self.points.first() {
            Some(first) if self.points.len() >= 3 => {
                geometry::distance(first.position, position) <= self.close_threshold
            }
            _ => false,
        }
    }

    /// Finish an area capture explicitly; needs at least 3 points
    pub fn finish(&mut self, registry: &mut VisualRegistry) -> Option<CaptureOutcome> {
        match self.tool.kind() {
            Some(kind @ MeasurementKind::Area) if self.points.len() >= kind.min_points() => {
                Some(self.complete(kind, registry))
            }
            _ => None,
        }
    }

    fn complete(&mut self, kind: MeasurementKind, registry: &mut VisualRegistry) -> CaptureOutcome {
        let points = std::mem::take(&mut self.points);
        self.discard(registry);
        self.tool = Tool::None;
        CaptureOutcome::Completed { kind, points }
    }

    /// Remove the most recent point and its visuals
    pub fn undo_last(&mut self, registry: &mut VisualRegistry) -> bool {
        if self.points.pop().is_none() {
            return false;
        }
        self.clear_hover(registry);
        if let Some(v) = self.visuals.pop() {
            dispose_point_visuals(v, registry);
        }
        debug!("Undo: {} point(s) remain", self.points.len());
        true
    }

    /// Remove an arbitrary point; the segment chain is rebuilt
    pub fn remove_point(&mut self, index: usize, registry: &mut VisualRegistry) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.clear_hover(registry);
        self.points.remove(index);
        for v in self.visuals.drain(..) {
            dispose_point_visuals(v, registry);
        }
        for i in 0..self.points.len() {
            let visuals = self.spawn_point_visuals(i, registry);
            self.visuals.push(visuals);
        }
        true
    }

    fn spawn_point_visuals(&self, index: usize, registry: &mut VisualRegistry) -> TempPointVisuals {
        let p = self.points[index].position;
        let marker = registry.spawn(Visual::marker(p, MarkerMaterial::Preview));
        let segment = index.checked_sub(1).map(|prev| {
            let from = self.points[prev].position;
            let line = registry.spawn(Visual::line(from, p, LineStyle::Solid));
            let text = geometry::format_value(geometry::distance(from, p), "m");
            let label = registry.spawn(Visual::label(geometry::midpoint(from, p), text));
            (line, label)
        });
        TempPointVisuals { marker, segment }
    }

    /// Rebuild the live preview towards `hover`; `None` clears it
    pub fn set_hover(&mut self, hover: Option<DVec3>, registry: &mut VisualRegistry) {
        self.clear_hover(registry);

        let (Some(kind), Some(hover), Some(last)) = (self.tool.kind(), hover, self.points.last())
        else {
            return;
        };
        let last = last.position;

        self.hover
            .lines
            .push(registry.spawn(Visual::line(last, hover, LineStyle::Preview)));

        let mut tentative: Vec<DVec3> = self.points.iter().map(|p| p.position).collect();
        tentative.push(hover);

        let anchor = if kind == MeasurementKind::Area && self.points.len() >= 2 {
            let first = self.points[0].position;
            self.hover
                .lines
                .push(registry.spawn(Visual::line(hover, first, LineStyle::Closing)));
            self.hover.fill = Some(registry.spawn(Visual::fill(tentative.clone(), true)));
            geometry::centroid(&tentative)
        } else {
            geometry::midpoint(last, hover)
        };

        if kind == MeasurementKind::Area && tentative.len() < 3 {
            return;
        }

        let value = geometry::measure(kind, &tentative);
        let inclination = geometry::measure_inclination(kind, &tentative);
        let text = geometry::format_label(kind, value, inclination, self.inclination_threshold);
        self.hover.label = Some(registry.spawn(Visual::label(anchor, text)));
        self.hover.value = Some(value);
    }

    fn clear_hover(&mut self, registry: &mut VisualRegistry) {
        let hover = std::mem::take(&mut self.hover);
        registry.dispose_all(hover.lines);
        registry.dispose_all(hover.fill);
        registry.dispose_all(hover.label);
    }
}

fn dispose_point_visuals(v: TempPointVisuals, registry: &mut VisualRegistry) {
    registry.dispose(v.marker);
    if let Some((line, label)) = v.segment {
        registry.dispose(line);
        registry.dispose(label);
    }
}
