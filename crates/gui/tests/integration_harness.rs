//! Integration tests for TestHarness.
//!
//! Drives a measuring session over a flat ground plane through the
//! same pointer gestures the viewport produces.

use shared::MeasurementKind;
use tapeline_gui_lib::fixtures;
use tapeline_gui_lib::harness::TestHarness;
use tapeline_gui_lib::measure::geometry::distance;
use tapeline_gui_lib::measure::{MarkerMaterial, NoticeLevel, PointDeletion, Tool};

const EPS: f64 = 1e-3;

#[test]
fn test_length_three_four_five() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (3.0, 4.0)).unwrap();

    let m = h.measurement(&id).unwrap();
    assert_eq!(m.kind, MeasurementKind::Length);
    assert!((m.value() - 5.0).abs() < EPS);
    assert!(m.inclination().unwrap().abs() < 0.1);
    // Flat measurement: no angle in the label
    assert_eq!(m.label_text(h.session.settings().inclination_threshold), "5.00 m");
    assert!(h.rows()[0].inclination_text.is_none());
}

#[test]
fn test_area_closes_on_first_point() {
    let mut h = TestHarness::new();
    h.select_tool(Tool::Area);
    assert!(h.click_at(0.0, 0.0).is_none());
    assert!(h.click_at(4.0, 0.0).is_none());
    assert!(h.click_at(4.0, 3.0).is_none());
    // Within the closing threshold of the first point
    let id = h.click_at(0.05, 0.05).unwrap();

    let m = h.measurement(&id).unwrap();
    assert_eq!(m.points().len(), 3);
    assert!((m.value() - 6.0).abs() < EPS);
    assert_eq!(h.capture_len(), 0);
}

#[test]
fn test_area_finish_with_enter() {
    let mut h = TestHarness::new();
    h.select_tool(Tool::Area);
    for (x, z) in [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)] {
        h.click_at(x, z);
    }
    let id = h.finish().unwrap();
    assert!((h.value_of(&id).unwrap() - 4.0).abs() < EPS);
}

#[test]
fn test_clear_all_disposes_every_visual() {
    let mut h = TestHarness::new();
    h.measure_length((0.0, 0.0), (1.0, 0.0)).unwrap();
    h.measure_length((0.0, 2.0), (0.0, 5.0)).unwrap();
    h.measure_two(Tool::Height, (1.0, 1.0), (2.0, 2.0)).unwrap();
    h.measure_area(&[(5.0, 5.0), (7.0, 5.0), (7.0, 7.0)]).unwrap();
    h.measure_area(&[(-5.0, -5.0), (-3.0, -5.0), (-3.0, -3.0), (-5.0, -3.0)]).unwrap();
    assert_eq!(h.measurement_count(), 5);
    assert!(h.visual_count() > 0);

    assert_eq!(h.clear(), 5);
    assert_eq!(h.measurement_count(), 0);
    assert_eq!(h.visual_count(), 0);
    assert!(h.rows().is_empty());
}

#[test]
fn test_undo_to_empty_leaves_no_preview() {
    let mut h = TestHarness::new();
    h.select_tool(Tool::Area);
    h.click_at(0.0, 0.0);
    h.click_at(3.0, 0.0);
    h.hover_at(3.0, 3.0);
    h.click_at(3.0, 3.0);
    assert_eq!(h.capture_len(), 3);

    while h.undo_point() {}
    assert_eq!(h.capture_len(), 0);
    h.session.pointer_left();
    assert_eq!(h.visual_count(), 0);
    assert!(!h.undo_point());
}

#[test]
fn test_deleting_length_point_deletes_measurement() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();

    let result = h.delete_point(&id, 0);
    assert_eq!(
        result,
        PointDeletion::MeasurementDeleted { kind: MeasurementKind::Length, min_points: 2 }
    );
    assert_eq!(h.measurement_count(), 0);
    assert_eq!(h.visual_count(), 0);

    let notices = h.take_notices();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Warning));
}

#[test]
fn test_deleting_area_point_keeps_larger_polygon() {
    let mut h = TestHarness::new();
    let id = h.measure_area(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]).unwrap();
    assert_eq!(h.delete_point(&id, 3), PointDeletion::Removed);

    let m = h.measurement(&id).unwrap();
    assert_eq!(m.points().len(), 3);
    assert!((m.value() - 8.0).abs() < EPS);
}

#[test]
fn test_edit_mode_round_trip_restores_markers() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();
    let before: Vec<_> = (0..2).map(|i| h.marker_material(&id, i)).collect();
    assert!(before.iter().all(|m| *m == Some(MarkerMaterial::Standard)));

    assert_eq!(h.toggle_edit_mode(&id), Some(true));
    assert_eq!(h.marker_material(&id, 0), Some(MarkerMaterial::Editable));

    assert_eq!(h.toggle_edit_mode(&id), Some(false));
    let after: Vec<_> = (0..2).map(|i| h.marker_material(&id, i)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_drag_updates_value_to_new_distance() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();
    h.toggle_edit_mode(&id);
    h.hover_at(2.0, 0.0);
    assert!(h.drag((2.0, 0.0), (3.0, 4.0)));

    let m = h.measurement(&id).unwrap();
    let p = m.positions();
    assert!((m.value() - distance(p[0], p[1])).abs() < 1e-12);
    assert!((m.value() - 5.0).abs() < EPS);
    // The release click did not start a new capture
    assert_eq!(h.capture_len(), 0);
    assert_eq!(h.measurement_count(), 1);
}

#[test]
fn test_drag_ignored_outside_edit_mode() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();
    h.hover_at(2.0, 0.0);
    assert!(!h.drag((2.0, 0.0), (6.0, 0.0)));
    assert!((h.value_of(&id).unwrap() - 2.0).abs() < EPS);
}

#[test]
fn test_hidden_measurement_keeps_value() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (1.0, 0.0)).unwrap();
    let shown = h.visual_count();
    assert_eq!(h.toggle_visibility(&id), Some(false));
    assert!(!h.rows()[0].visible);
    assert_eq!(h.visual_count(), shown);
    assert!((h.value_of(&id).unwrap() - 1.0).abs() < EPS);
}

#[test]
fn test_description_shows_in_rows() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (1.0, 0.0)).unwrap();
    assert!(h.describe(&id, "  north wall "));
    assert_eq!(h.rows()[0].description.as_deref(), Some("north wall"));
}

#[test]
fn test_restore_mixed_snapshot() {
    let mut h = TestHarness::new();
    let restored = h.restore(&fixtures::mixed_snapshot("ground"));
    assert_eq!(restored, 3);
    assert_eq!(h.count_of(MeasurementKind::Length), 1);
    assert_eq!(h.count_of(MeasurementKind::Height), 1);
    assert_eq!(h.count_of(MeasurementKind::Area), 1);

    let snap = h.snapshot();
    assert_eq!(snap.measurements.len(), 3);
    assert!(h.visual_count() > 0);
}

#[test]
fn test_demo_site_measures_block_height() {
    let mut h = TestHarness::demo();
    assert!(h.validate_model().is_empty());
    // From the slab next to the block up onto its 3 m top
    let id = h.measure_two(Tool::Height, (-8.0, -4.0), (-5.0, -4.0)).unwrap();
    assert!((h.value_of(&id).unwrap() - 3.0).abs() < EPS);
}
