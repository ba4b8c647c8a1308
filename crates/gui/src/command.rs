//! JSON command protocol for scripted measuring sessions.
//!
//! Every command maps onto one harness call; pointer positions are ground
//! coordinates, as in `TestHarness`.

use serde::{Deserialize, Serialize};
use shared::MeasurementSnapshot;

use crate::harness::TestHarness;
use crate::measure::{PointDeletion, Tool};

/// A command a script can execute against a measuring session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MeasureCommand {
    /// Activate a tool (`none`, `length`, `height`, `area`)
    SelectTool {
        tool: Tool,
    },
    /// Click on the model at ground coordinates
    Click {
        x: f32,
        z: f32,
    },
    /// Move the pointer over the model
    Hover {
        x: f32,
        z: f32,
    },
    /// Press the primary button (starts a drag over an editable marker)
    Press {
        x: f32,
        z: f32,
    },
    /// Release the primary button.
    Release,
    /// Remove the last captured point.
    UndoPoint,
    /// Close the area in progress.
    Finish,
    /// Abort the capture in progress.
    Cancel,
    /// Remove every measurement.
    Clear,
    Delete {
        id: String,
    },
    DeletePoint {
        id: String,
        index: usize,
    },
    Describe {
        id: String,
        text: String,
    },
    ToggleVisibility {
        id: String,
    },
    ToggleEditMode {
        id: String,
    },
    /// List measurements and session state.
    Inspect,
    /// Export the measurement list as a snapshot.
    Snapshot,
    /// Replace all measurements with a snapshot.
    Restore {
        snapshot: MeasurementSnapshot,
    },
    /// Build the report of finalized measurements.
    ExportReport {
        #[serde(default = "default_report_title")]
        title: String,
    },
}

fn default_report_title() -> String {
    "Measurements".to_string()
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> CommandResponse {
    match serde_json::to_value(value) {
        Ok(data) => CommandResponse::ok_with_data(data),
        Err(e) => CommandResponse::err(format!("Failed to serialize response: {e}")),
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: MeasureCommand) -> CommandResponse {
    match cmd {
        MeasureCommand::SelectTool { tool } => {
            harness.select_tool(tool);
            CommandResponse::ok()
        }

        MeasureCommand::Click { x, z } => {
            let completed = harness.click_at(x, z);
            CommandResponse::ok_with_data(serde_json::json!({
                "completed": completed,
                "capture_points": harness.capture_len(),
            }))
        }

        MeasureCommand::Hover { x, z } => {
            harness.hover_at(x, z);
            CommandResponse::ok_with_data(serde_json::json!({
                "preview_value": harness.session.capture().preview_value(),
                "cursor": harness.session.cursor_intent(),
            }))
        }

        MeasureCommand::Press { x, z } => {
            let dragging = harness.press_at(x, z);
            CommandResponse::ok_with_data(serde_json::json!({ "dragging": dragging }))
        }

        MeasureCommand::Release => {
            harness.release();
            CommandResponse::ok()
        }

        MeasureCommand::UndoPoint => {
            let undone = harness.undo_point();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": undone }))
        }

        MeasureCommand::Finish => match harness.finish() {
            Some(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
            None => CommandResponse::err("Nothing to finish: an area needs at least 3 points"),
        },

        MeasureCommand::Cancel => {
            harness.cancel();
            CommandResponse::ok()
        }

        MeasureCommand::Clear => {
            let removed = harness.clear();
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        MeasureCommand::Delete { id } => {
            if harness.delete(&id) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Measurement not found: {id}"))
            }
        }

        MeasureCommand::DeletePoint { id, index } => match harness.delete_point(&id, index) {
            PointDeletion::Removed => {
                CommandResponse::ok_with_data(serde_json::json!({ "measurement_deleted": false }))
            }
            PointDeletion::MeasurementDeleted { .. } => {
                CommandResponse::ok_with_data(serde_json::json!({ "measurement_deleted": true }))
            }
            PointDeletion::NotFound => {
                CommandResponse::err(format!("No point {index} on measurement {id}"))
            }
        },

        MeasureCommand::Describe { id, text } => {
            if harness.describe(&id, &text) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Measurement not found: {id}"))
            }
        }

        MeasureCommand::ToggleVisibility { id } => match harness.toggle_visibility(&id) {
            Some(visible) => CommandResponse::ok_with_data(serde_json::json!({ "visible": visible })),
            None => CommandResponse::err(format!("Measurement not found: {id}")),
        },

        MeasureCommand::ToggleEditMode { id } => match harness.toggle_edit_mode(&id) {
            Some(edit_mode) => {
                CommandResponse::ok_with_data(serde_json::json!({ "edit_mode": edit_mode }))
            }
            None => CommandResponse::err(format!("Measurement not found: {id}")),
        },

        MeasureCommand::Inspect => {
            let rows = harness.rows();
            let counts = harness.session.registry().counts();
            CommandResponse::ok_with_data(serde_json::json!({
                "measurement_count": rows.len(),
                "measurements": rows,
                "tool": harness.session.active_tool(),
                "capture_points": harness.capture_len(),
                "visuals": counts.total(),
                "orbit_enabled": harness.session.orbit_enabled(),
            }))
        }

        MeasureCommand::Snapshot => to_value(&harness.snapshot()),

        MeasureCommand::Restore { snapshot } => {
            let restored = harness.restore(&snapshot);
            CommandResponse::ok_with_data(serde_json::json!({ "restored": restored }))
        }

        MeasureCommand::ExportReport { title } => to_value(&harness.session.export_report(&title)),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: MeasureCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<MeasureCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
