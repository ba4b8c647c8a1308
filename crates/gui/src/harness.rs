//! Headless test harness for driving a measuring session programmatically.
//!
//! Pointer input is given as ground coordinates: every helper casts a
//! vertical ray down onto the model at `(x, z)`.

use glam::DVec3;
use shared::{MeasurementId, MeasurementKind, MeasurementSnapshot};

use crate::measure::{
    MarkerMaterial, MeasureSession, Measurement, MeasurementRow, Notice, PointDeletion, Tool,
    VisualId,
};
use crate::model::{demo_site, LoadedModel};
use crate::state::settings::MeasureSettings;
use crate::validation::MeshValidator;
use crate::viewport::mesh::ground_plane;
use crate::viewport::picking::Ray;

/// Edge length of the default flat test ground, centred on the origin
pub const GROUND_SIZE: f32 = 40.0;

/// Headless test harness: a session over a flat ground plane at y = 0
pub struct TestHarness {
    pub session: MeasureSession,
}

impl TestHarness {
    /// Create a harness over a flat 40 m ground plane.
    pub fn new() -> Self {
        Self::with_settings(MeasureSettings::default())
    }

    pub fn with_settings(settings: MeasureSettings) -> Self {
        let mut session = MeasureSession::new(settings);
        session.set_model(
            Some("ground".to_string()),
            ground_plane(GROUND_SIZE, 0.0, [0.5, 0.5, 0.5]),
        );
        Self { session }
    }

    /// Create a harness over the built-in demo site (block and ramp on a slab).
    pub fn demo() -> Self {
        let mut h = Self::with_settings(MeasureSettings::default());
        h.load_model(demo_site());
        h
    }

    /// Replace the model; existing measurements are dropped
    pub fn load_model(&mut self, model: LoadedModel) {
        self.session.set_model(Some(model.name), model.mesh);
    }

    // ── Pointer input ─────────────────────────────────────────

    /// Click at ground coordinates; returns the finalized measurement id, if any
    pub fn click_at(&mut self, x: f32, z: f32) -> Option<MeasurementId> {
        self.session.clicked(&Ray::down_at(x, z))
    }

    pub fn hover_at(&mut self, x: f32, z: f32) {
        self.session.pointer_moved(&Ray::down_at(x, z));
    }

    /// Press at ground coordinates; true when a point drag started
    pub fn press_at(&mut self, x: f32, z: f32) -> bool {
        self.session.pointer_pressed(&Ray::down_at(x, z))
    }

    pub fn release(&mut self) {
        self.session.pointer_released();
    }

    /// Full press-move-release-click gesture, as the viewport reports it
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32)) -> bool {
        if !self.press_at(from.0, from.1) {
            return false;
        }
        self.hover_at(to.0, to.1);
        self.release();
        // The UI reports a click at the release position; it must not capture
        self.click_at(to.0, to.1);
        true
    }

    // ── Measurements ──────────────────────────────────────────

    pub fn select_tool(&mut self, tool: Tool) {
        self.session.select_tool(tool);
    }

    /// Capture a two-point measurement along the ground
    pub fn measure_two(&mut self, tool: Tool, a: (f32, f32), b: (f32, f32)) -> Option<MeasurementId> {
        self.select_tool(tool);
        self.click_at(a.0, a.1);
        self.click_at(b.0, b.1)
    }

    pub fn measure_length(&mut self, a: (f32, f32), b: (f32, f32)) -> Option<MeasurementId> {
        self.measure_two(Tool::Length, a, b)
    }

    /// Click every corner and then the first corner again to close the polygon
    pub fn measure_area(&mut self, corners: &[(f32, f32)]) -> Option<MeasurementId> {
        self.select_tool(Tool::Area);
        for &(x, z) in corners {
            self.click_at(x, z);
        }
        let (x, z) = *corners.first()?;
        self.click_at(x, z)
    }

    /// Capture a length between two exact positions, bypassing picking
    pub fn measure_between(&mut self, a: DVec3, b: DVec3) -> Option<MeasurementId> {
        self.select_tool(Tool::Length);
        self.session.add_capture_point(a);
        self.session.add_capture_point(b)
    }

    pub fn finish(&mut self) -> Option<MeasurementId> {
        self.session.finish_capture()
    }

    pub fn undo_point(&mut self) -> bool {
        self.session.undo_last_point()
    }

    pub fn cancel(&mut self) {
        self.session.cancel_capture();
    }

    pub fn clear(&mut self) -> usize {
        self.session.clear_all()
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.session.delete_measurement(id)
    }

    pub fn delete_point(&mut self, id: &str, index: usize) -> PointDeletion {
        self.session.delete_single_point(id, index)
    }

    pub fn toggle_edit_mode(&mut self, id: &str) -> Option<bool> {
        self.session.toggle_edit_mode(id)
    }

    pub fn toggle_visibility(&mut self, id: &str) -> Option<bool> {
        self.session.toggle_visibility(id)
    }

    pub fn describe(&mut self, id: &str, text: &str) -> bool {
        self.session.update_description(id, text)
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn measurement(&self, id: &str) -> Option<&Measurement> {
        self.session.store().get(id)
    }

    pub fn value_of(&self, id: &str) -> Option<f64> {
        self.measurement(id).map(|m| m.value())
    }

    /// Number of finalized measurements
    pub fn measurement_count(&self) -> usize {
        self.session.store().len()
    }

    pub fn count_of(&self, kind: MeasurementKind) -> usize {
        self.session.store().iter().filter(|m| m.kind == kind).count()
    }

    /// Points of the capture in progress
    pub fn capture_len(&self) -> usize {
        self.session.capture().points().len()
    }

    /// Live renderables of any kind
    pub fn visual_count(&self) -> usize {
        self.session.registry().live_count()
    }

    /// Marker handle of a finalized point
    pub fn marker(&self, id: &str, index: usize) -> Option<VisualId> {
        self.session.store().marker_of(id, index)
    }

    pub fn marker_material(&self, id: &str, index: usize) -> Option<MarkerMaterial> {
        self.marker(id, index)
            .and_then(|marker| self.session.registry().marker_material(marker))
    }

    pub fn rows(&self) -> Vec<MeasurementRow> {
        self.session.rows()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.session.take_notices()
    }

    pub fn snapshot(&self) -> MeasurementSnapshot {
        self.session.snapshot()
    }

    pub fn restore(&mut self, snapshot: &MeasurementSnapshot) -> usize {
        self.session.restore(snapshot)
    }

    pub fn validate_model(&self) -> Vec<String> {
        match self.session.picking().model_mesh() {
            Some(mesh) => MeshValidator::new(mesh).validate_all(),
            None => vec!["No model loaded".to_string()],
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert_eq!(h.measurement_count(), 0);
        assert_eq!(h.visual_count(), 0);
        assert!(h.validate_model().is_empty());
    }

    #[test]
    fn test_measure_length() {
        let mut h = TestHarness::new();
        let id = h.measure_length((0.0, 0.0), (3.0, 4.0)).unwrap();
        assert!((h.value_of(&id).unwrap() - 5.0).abs() < 1e-3);
        assert_eq!(h.measurement_count(), 1);
        assert_eq!(h.session.active_tool(), Tool::None);
    }

    #[test]
    fn test_measure_area() {
        let mut h = TestHarness::new();
        let id = h.measure_area(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]).unwrap();
        assert!((h.value_of(&id).unwrap() - 8.0).abs() < 1e-3);
        assert_eq!(h.measurement(&id).unwrap().points().len(), 4);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut h = TestHarness::new();
        h.measure_length((0.0, 0.0), (1.0, 0.0));
        h.select_tool(Tool::Area);
        h.click_at(5.0, 5.0);
        assert_eq!(h.clear(), 1);
        assert_eq!(h.visual_count(), 0);
        assert_eq!(h.capture_len(), 0);
    }

    #[test]
    fn test_drag_moves_point() {
        let mut h = TestHarness::new();
        let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();
        h.toggle_edit_mode(&id);
        assert!(h.drag((2.0, 0.0), (6.0, 0.0)));
        assert!((h.value_of(&id).unwrap() - 6.0).abs() < 1e-3);
        assert_eq!(h.measurement_count(), 1);
    }

    #[test]
    fn test_demo_harness_has_valid_model() {
        let h = TestHarness::demo();
        assert!(h.validate_model().is_empty());
        assert_eq!(h.session.model_name(), Some("demo-site"));
    }
}
