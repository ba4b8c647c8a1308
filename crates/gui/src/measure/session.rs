//! One measuring session over one loaded model.
//!
//! `MeasureSession` is the only owner of the capture state, the drag state,
//! the store and the renderable registry. The viewport forwards pointer rays,
//! the panels call the command methods, and the renderer reads the registry.

use glam::DVec3;
use serde::Serialize;
use shared::{ExportReport, MeasurementId, MeasurementSnapshot};
use tracing::{debug, info, warn};

use crate::export;
use crate::i18n::{kind_label, t};
use crate::state::settings::MeasureSettings;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{PickingService, Ray};

use super::capture::{CaptureOutcome, CaptureState};
use super::drag::DragController;
use super::store::{MeasurementStore, MeasurementUpdate, PointDeletion};
use super::types::{MeasurementRow, Tool};
use super::visuals::{VisualId, VisualRegistry};

/// How the UI should draw the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorIntent {
    #[default]
    Default,
    /// A tool is active and the next click captures a point
    Pointer,
    /// Over a marker that can be dragged
    Grab,
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient user-facing message (toast)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

pub struct MeasureSession {
    picking: PickingService,
    registry: VisualRegistry,
    store: MeasurementStore,
    capture: CaptureState,
    drag: DragController,
    settings: MeasureSettings,
    hovered: Option<VisualId>,
    notices: Vec<Notice>,
    model_name: Option<String>,
    version: u64,
}

impl Default for MeasureSession {
    fn default() -> Self {
        Self::new(MeasureSettings::default())
    }
}

impl MeasureSession {
    pub fn new(settings: MeasureSettings) -> Self {
        Self {
            picking: PickingService::default(),
            registry: VisualRegistry::new(),
            store: MeasurementStore::new(settings.inclination_threshold),
            capture: CaptureState::new(settings.close_threshold, settings.inclination_threshold),
            drag: DragController::new(),
            settings,
            hovered: None,
            notices: Vec::new(),
            model_name: None,
            version: 0,
        }
    }

    // ── Model ───────────────────────────────────────────────

    /// Install a new model; measurements of the previous model are dropped
    pub fn set_model(&mut self, name: Option<String>, mesh: MeshData) {
        self.reset_interaction();
        self.store.clear(&mut self.registry);
        self.picking.set_model(mesh);
        info!("Measuring on model {:?}", name);
        self.model_name = name;
        self.bump();
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn picking(&self) -> &PickingService {
        &self.picking
    }

    pub fn registry(&self) -> &VisualRegistry {
        &self.registry
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn settings(&self) -> &MeasureSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: MeasureSettings) {
        self.capture
            .set_thresholds(settings.close_threshold, settings.inclination_threshold);
        self.store
            .set_inclination_threshold(settings.inclination_threshold, &mut self.registry);
        self.settings = settings;
    }

    /// Increments on every committed change to the measurement list
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    // ── Pointer input ───────────────────────────────────────

    /// Pointer moved over the viewport: drag, hover highlight and capture preview
    pub fn pointer_moved(&mut self, ray: &Ray) {
        if let Some((id, index)) = self.drag.target() {
            let (id, index) = (id.to_string(), index);
            // No hit keeps the last valid position
            let Some(hit) = self.picking.pick_surface(ray) else {
                return;
            };
            if self
                .store
                .update_point_position(&id, index, hit.as_dvec3(), &mut self.registry)
            {
                self.bump();
            } else {
                warn!("Dragged measurement {} point {} no longer exists", id, index);
                self.drag.cancel();
            }
            return;
        }

        let markers = self.store.pickable_markers(false);
        let hovered = self
            .picking
            .pick_marker(ray, markers, self.settings.marker_pick_radius);
        self.set_hovered(hovered);

        if self.capture.is_capturing() {
            let hit = self.picking.pick_surface(ray).map(|p| p.as_dvec3());
            self.capture.set_hover(hit, &mut self.registry);
        }
    }

    /// Pointer left the viewport
    pub fn pointer_left(&mut self) {
        self.set_hovered(None);
        self.capture.set_hover(None, &mut self.registry);
    }

    /// Pointer pressed; returns true when a point drag started
    pub fn pointer_pressed(&mut self, ray: &Ray) -> bool {
        // A stale suppression from an earlier drag must not eat this click
        self.drag.take_click_suppression();

        let markers = self.store.pickable_markers(true);
        let Some(marker) = self
            .picking
            .pick_marker(ray, markers, self.settings.marker_pick_radius)
        else {
            return false;
        };
        let Some(owner) = self.store.owner_of(marker).cloned() else {
            warn!("Marker {:?} has no owning measurement", marker);
            return false;
        };

        self.set_hovered(Some(marker));
        self.capture.set_hover(None, &mut self.registry);
        self.drag.begin(owner.measurement_id, owner.point_index);
        true
    }

    pub fn pointer_released(&mut self) {
        self.drag.end();
    }

    /// Click on the viewport: captures a point when a tool is active.
    ///
    /// Returns the id of a measurement finalized by this click.
    pub fn clicked(&mut self, ray: &Ray) -> Option<MeasurementId> {
        if self.drag.take_click_suppression() || self.drag.is_dragging() {
            return None;
        }
        if !self.capture.is_capturing() {
            return None;
        }
        let hit = self.picking.pick_surface(ray)?;
        let outcome = self.capture.add_point(hit.as_dvec3(), &mut self.registry);
        self.finalize(outcome)
    }

    /// Capture a point directly, bypassing picking
    pub fn add_capture_point(&mut self, position: DVec3) -> Option<MeasurementId> {
        let outcome = self.capture.add_point(position, &mut self.registry);
        self.finalize(outcome)
    }

    fn finalize(&mut self, outcome: CaptureOutcome) -> Option<MeasurementId> {
        match outcome {
            CaptureOutcome::Completed { kind, points } => {
                let id = self.store.create(kind, points, &mut self.registry);
                self.bump();
                Some(id)
            }
            CaptureOutcome::Appended { index } => {
                debug!("Capture has {} point(s)", index + 1);
                None
            }
            CaptureOutcome::Ignored => None,
        }
    }

    fn set_hovered(&mut self, marker: Option<VisualId>) {
        if self.hovered == marker {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.registry.set_hovered(old, false);
        }
        if let Some(new) = marker {
            self.registry.set_hovered(new, true);
        }
        self.hovered = marker;
    }

    /// Drop a hover reference whose marker was released
    fn refresh_hovered(&mut self) {
        if let Some(id) = self.hovered {
            if !self.registry.contains(id) {
                self.hovered = None;
            }
        }
    }

    fn reset_interaction(&mut self) {
        self.drag.cancel();
        self.set_hovered(None);
        self.capture.cancel(&mut self.registry);
    }

    pub fn hovered_marker(&self) -> Option<VisualId> {
        self.hovered
    }

    /// Camera orbit is allowed whenever no point is being dragged
    pub fn orbit_enabled(&self) -> bool {
        self.drag.orbit_enabled()
    }

    pub fn cursor_intent(&self) -> CursorIntent {
        if self.drag.is_dragging() {
            return CursorIntent::Grabbing;
        }
        let over_editable = self
            .hovered
            .and_then(|marker| self.store.owner_of(marker))
            .and_then(|owner| self.store.get(&owner.measurement_id))
            .is_some_and(|m| m.edit_mode);
        if over_editable {
            CursorIntent::Grab
        } else if self.capture.is_capturing() {
            CursorIntent::Pointer
        } else {
            CursorIntent::Default
        }
    }

    // ── Commands ────────────────────────────────────────────

    pub fn active_tool(&self) -> Tool {
        self.capture.tool()
    }

    /// Switch tools; in-progress points and any drag are discarded
    /// Re-selecting the active tool keeps the capture
    pub fn select_tool(&mut self, tool: Tool) {
        if self.capture.tool() == tool {
            return;
        }
        self.drag.cancel();
        self.capture.select_tool(tool, &mut self.registry);
    }

    pub fn can_undo(&self) -> bool {
        self.capture.can_undo()
    }

    pub fn undo_last_point(&mut self) -> bool {
        self.capture.undo_last(&mut self.registry)
    }

    pub fn remove_capture_point(&mut self, index: usize) -> bool {
        self.capture.remove_point(index, &mut self.registry)
    }

    /// Complete an area capture with the points gathered so far
    pub fn finish_capture(&mut self) -> Option<MeasurementId> {
        if self.capture.tool() == Tool::Area && self.capture.points().len() < 3 {
            self.notices.push(Notice::warning(t("notice.area_min_points")));
            return None;
        }
        let outcome = self.capture.finish(&mut self.registry)?;
        self.finalize(outcome)
    }

    pub fn cancel_capture(&mut self) {
        self.drag.cancel();
        self.capture.cancel(&mut self.registry);
    }

    /// Remove every measurement and abort capture and drag
    pub fn clear_all(&mut self) -> usize {
        self.reset_interaction();
        let removed = self.store.clear(&mut self.registry);
        self.bump();
        removed
    }

    pub fn delete_measurement(&mut self, id: &str) -> bool {
        if self.drag.target().is_some_and(|(drag_id, _)| drag_id == id) {
            self.drag.cancel();
        }
        let deleted = self.store.delete(id, &mut self.registry).is_some();
        self.refresh_hovered();
        if deleted {
            self.bump();
        }
        deleted
    }

    pub fn update_description(&mut self, id: &str, text: &str) -> bool {
        let updated = self.store.set_description(id, text);
        if updated {
            self.bump();
        }
        updated
    }

    /// Partial update of one measurement
    pub fn update_measurement(&mut self, id: &str, update: MeasurementUpdate) -> bool {
        let reshaped = update.points.is_some() || update.edit_mode == Some(false);
        if reshaped && self.drag.target().is_some_and(|(drag_id, _)| drag_id == id) {
            self.drag.cancel();
        }
        let updated = self.store.update(id, update, &mut self.registry);
        self.refresh_hovered();
        if updated {
            self.bump();
        }
        updated
    }

    /// Returns the new visibility, or None for an unknown id
    pub fn toggle_visibility(&mut self, id: &str) -> Option<bool> {
        let visible = !self.store.get(id)?.visible;
        self.update_measurement(
            id,
            MeasurementUpdate {
                visible: Some(visible),
                ..Default::default()
            },
        );
        Some(visible)
    }

    /// Returns the new edit mode, or None for an unknown id
    pub fn toggle_edit_mode(&mut self, id: &str) -> Option<bool> {
        let edit_mode = !self.store.get(id)?.edit_mode;
        self.update_measurement(
            id,
            MeasurementUpdate {
                edit_mode: Some(edit_mode),
                ..Default::default()
            },
        );
        Some(edit_mode)
    }

    /// Delete one point; a measurement left below its minimum is removed with a notice
    pub fn delete_single_point(&mut self, id: &str, point_index: usize) -> PointDeletion {
        if self.drag.target().is_some_and(|(drag_id, _)| drag_id == id) {
            self.drag.cancel();
        }
        let outcome = self
            .store
            .delete_single_point(id, point_index, &mut self.registry);
        self.refresh_hovered();
        match &outcome {
            PointDeletion::MeasurementDeleted { kind, min_points } => {
                let text = t("notice.cascade_delete")
                    .replace("{kind}", kind_label(*kind))
                    .replace("{n}", &min_points.to_string());
                self.notices.push(Notice::warning(text));
                self.bump();
            }
            PointDeletion::Removed => self.bump(),
            PointDeletion::NotFound => warn!("No point {} on measurement {}", point_index, id),
        }
        outcome
    }

    /// Queue a message for the status bar
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn rows(&self) -> Vec<MeasurementRow> {
        self.store
            .iter()
            .map(|m| MeasurementRow::from_measurement(m, self.settings.inclination_threshold))
            .collect()
    }

    // ── Persistence / export ────────────────────────────────

    /// Plain-data copy of the measurement list
    pub fn snapshot(&self) -> MeasurementSnapshot {
        MeasurementSnapshot::new(self.model_name.clone(), self.store.records())
    }

    /// Replace all measurements with the snapshot's; returns how many were restored
    pub fn restore(&mut self, snapshot: &MeasurementSnapshot) -> usize {
        self.reset_interaction();
        self.store.clear(&mut self.registry);
        let restored = snapshot
            .measurements
            .iter()
            .filter_map(|record| self.store.restore(record, &mut self.registry))
            .count();
        info!(
            "Restored {} of {} measurement(s)",
            restored,
            snapshot.measurements.len()
        );
        self.bump();
        restored
    }

    pub fn export_report(&self, title: &str) -> ExportReport {
        export::build_report(title, self.store.iter(), self.settings.inclination_threshold)
    }
}
