//! Integration tests for the MeasureCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use tapeline_gui_lib::command::{execute_json, execute_json_batch};
use tapeline_gui_lib::fixtures;
use tapeline_gui_lib::harness::TestHarness;

#[test]
fn test_command_length_by_clicks() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "select_tool", "tool": "length"},
        {"command": "click", "x": 0.0, "z": 0.0},
        {"command": "click", "x": 3.0, "z": 4.0},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 4);
    for resp in &responses {
        assert!(resp.success, "Failed: {:?}", resp.error);
    }

    let first = responses[1].data.as_ref().unwrap();
    assert!(first["completed"].is_null());
    assert_eq!(first["capture_points"], 1);

    let second = responses[2].data.as_ref().unwrap();
    assert!(second["completed"].as_str().is_some());

    let inspect = responses[3].data.as_ref().unwrap();
    assert_eq!(inspect["measurement_count"], 1);
    assert_eq!(inspect["tool"], "none");
    assert_eq!(inspect["measurements"][0]["kind"], "length");
    assert_eq!(inspect["measurements"][0]["value_text"], "5.00 m");
}

#[test]
fn test_command_area_finish() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "select_tool", "tool": "area"},
        {"command": "click", "x": 0.0, "z": 0.0},
        {"command": "click", "x": 4.0, "z": 0.0},
        {"command": "hover", "x": 4.0, "z": 3.0},
        {"command": "click", "x": 4.0, "z": 3.0},
        {"command": "finish"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    let hover = responses[3].data.as_ref().unwrap();
    let preview = hover["preview_value"].as_f64().unwrap();
    assert!((preview - 6.0).abs() < 1e-3);

    let finish = &responses[5];
    assert!(finish.success, "Failed: {:?}", finish.error);
    let id = finish.data.as_ref().unwrap()["id"].as_str().unwrap();
    assert!((h.value_of(id).unwrap() - 6.0).abs() < 1e-3);
}

#[test]
fn test_command_finish_too_early_fails() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "select_tool", "tool": "area"},
        {"command": "click", "x": 0.0, "z": 0.0},
        {"command": "click", "x": 1.0, "z": 0.0},
        {"command": "finish"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(!responses[3].success);
    assert_eq!(h.measurement_count(), 0);
    // The capture survives a rejected finish
    assert_eq!(h.capture_len(), 2);
}

#[test]
fn test_command_undo_and_cancel() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "select_tool", "tool": "height"},
        {"command": "click", "x": 0.0, "z": 0.0},
        {"command": "undo_point"},
        {"command": "undo_point"},
        {"command": "click", "x": 1.0, "z": 1.0},
        {"command": "cancel"},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[2].data.as_ref().unwrap()["undone"], true);
    assert_eq!(responses[3].data.as_ref().unwrap()["undone"], false);
    let inspect = responses[6].data.as_ref().unwrap();
    assert_eq!(inspect["capture_points"], 0);
    assert_eq!(inspect["visuals"], 0);
}

#[test]
fn test_command_edit_and_drag() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (2.0, 0.0)).unwrap();

    let toggle = execute_json(
        &mut h,
        &format!(r#"{{"command": "toggle_edit_mode", "id": "{id}"}}"#),
    )
    .unwrap();
    assert_eq!(toggle.data.unwrap()["edit_mode"], true);

    let json = r#"[
        {"command": "hover", "x": 2.0, "z": 0.0},
        {"command": "press", "x": 2.0, "z": 0.0},
        {"command": "inspect"},
        {"command": "hover", "x": 5.0, "z": 0.0},
        {"command": "release"},
        {"command": "click", "x": 5.0, "z": 0.0},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[0].data.as_ref().unwrap()["cursor"], "grab");
    assert_eq!(responses[1].data.as_ref().unwrap()["dragging"], true);
    assert_eq!(responses[2].data.as_ref().unwrap()["orbit_enabled"], false);

    let after = responses[6].data.as_ref().unwrap();
    assert_eq!(after["orbit_enabled"], true);
    assert_eq!(after["measurement_count"], 1);
    assert_eq!(after["capture_points"], 0);
    assert!((h.value_of(&id).unwrap() - 5.0).abs() < 1e-3);
}

#[test]
fn test_command_delete_point_cascades() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (1.0, 0.0)).unwrap();
    let resp = execute_json(
        &mut h,
        &format!(r#"{{"command": "delete_point", "id": "{id}", "index": 1}}"#),
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["measurement_deleted"], true);
    assert_eq!(h.measurement_count(), 0);
}

#[test]
fn test_command_unknown_measurement() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "delete", "id": "ghost"}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("ghost"));

    let resp = execute_json(&mut h, r#"{"command": "toggle_visibility", "id": "ghost"}"#).unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_restore_and_snapshot() {
    let mut h = TestHarness::new();
    let snapshot = serde_json::to_value(fixtures::mixed_snapshot("ground")).unwrap();
    let json = serde_json::json!({ "command": "restore", "snapshot": snapshot }).to_string();

    let resp = execute_json(&mut h, &json).unwrap();
    assert_eq!(resp.data.unwrap()["restored"], 3);

    let snap = execute_json(&mut h, r#"{"command": "snapshot"}"#).unwrap();
    let data = snap.data.unwrap();
    assert_eq!(data["measurements"].as_array().unwrap().len(), 3);
    assert_eq!(data["model"], "ground");
}

#[test]
fn test_command_export_report() {
    let mut h = TestHarness::new();
    let id = h.measure_length((0.0, 0.0), (3.0, 4.0)).unwrap();
    h.describe(&id, "fence");

    let resp = execute_json(&mut h, r#"{"command": "export_report", "title": "Yard"}"#).unwrap();
    let data = resp.data.unwrap();
    assert_eq!(data["title"], "Yard");
    let row = &data["rows"][0];
    assert_eq!(row["description"], "fence");
    assert_eq!(row["value"], 5.0);
    // Flat segment: no inclination in the report
    assert!(row.get("inclination").is_none());
}

#[test]
fn test_command_invalid_json_error() {
    let mut h = TestHarness::new();
    let result = execute_json(&mut h, "not valid json");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid command JSON"));
}
