//! Authoritative collection of finalized measurements.
//!
//! Renderables live in a side table keyed by measurement id, and markers
//! resolve back to their owner through `owners` instead of encoded names.

use std::collections::HashMap;

use glam::{DVec3, Vec3};
use shared::{MeasurementId, MeasurementRecord};
use tracing::{debug, info, warn};

use super::geometry;
use super::types::{Measurement, MeasurementKind, MeasurementPoint};
use super::visuals::{LineStyle, MarkerMaterial, MeasurementVisuals, Visual, VisualId, VisualRegistry};

/// Which point of which measurement a marker stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerOwner {
    pub measurement_id: MeasurementId,
    pub point_index: usize,
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct MeasurementUpdate {
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub visible: Option<bool>,
    pub edit_mode: Option<bool>,
    pub points: Option<Vec<MeasurementPoint>>,
}

/// Outcome of deleting one point
#[derive(Debug, Clone, PartialEq)]
pub enum PointDeletion {
    Removed,
    /// The measurement would fall below its minimum point count and was deleted
    MeasurementDeleted { kind: MeasurementKind, min_points: usize },
    NotFound,
}

#[derive(Debug)]
pub struct MeasurementStore {
    measurements: Vec<Measurement>,
    visuals: HashMap<MeasurementId, MeasurementVisuals>,
    owners: HashMap<VisualId, MarkerOwner>,
    inclination_threshold: f64,
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::new(geometry::DEFAULT_INCLINATION_THRESHOLD)
    }
}

impl MeasurementStore {
    pub fn new(inclination_threshold: f64) -> Self {
        Self {
            measurements: Vec::new(),
            visuals: HashMap::new(),
            owners: HashMap::new(),
            inclination_threshold,
        }
    }

    /// Change the label threshold; labels are rebuilt to match
    pub fn set_inclination_threshold(&mut self, threshold: f64, registry: &mut VisualRegistry) {
        if self.inclination_threshold == threshold {
            return;
        }
        self.inclination_threshold = threshold;
        let ids: Vec<MeasurementId> = self.measurements.iter().map(|m| m.id.clone()).collect();
        for id in ids {
            self.rebuild_derived(&id, registry);
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Measurement> {
        self.measurements.iter_mut().find(|m| m.id == id)
    }

    pub fn visuals_of(&self, id: &str) -> Option<&MeasurementVisuals> {
        self.visuals.get(id)
    }

    pub fn owner_of(&self, marker: VisualId) -> Option<&MarkerOwner> {
        self.owners.get(&marker)
    }

    pub fn marker_of(&self, id: &str, point_index: usize) -> Option<VisualId> {
        self.visuals.get(id)?.markers.get(point_index).copied()
    }

    /// Visible markers with their positions, optionally only those in edit mode
    pub fn pickable_markers(&self, editable_only: bool) -> Vec<(VisualId, Vec3)> {
        let mut out = Vec::new();
        for m in &self.measurements {
            if !m.visible || (editable_only && !m.edit_mode) {
                continue;
            }
            if let Some(visuals) = self.visuals.get(&m.id) {
                for (marker, point) in visuals.markers.iter().zip(m.points()) {
                    out.push((*marker, point.position.as_vec3()));
                }
            }
        }
        out
    }

    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.measurements.iter().map(Measurement::to_record).collect()
    }

    /// Finalize a captured point list into a new measurement
    pub fn create(
        &mut self,
        kind: MeasurementKind,
        points: Vec<MeasurementPoint>,
        registry: &mut VisualRegistry,
    ) -> MeasurementId {
        let id = uuid::Uuid::new_v4().to_string();
        let measurement = Measurement::new(id.clone(), kind, points);
        info!(
            "Created {:?} measurement {} = {}",
            kind,
            id,
            geometry::format_value(measurement.value(), measurement.unit())
        );
        self.insert(measurement, registry);
        id
    }

    /// Rehydrate a stored record; visuals are rebuilt from its points
    pub fn restore(&mut self, record: &MeasurementRecord, registry: &mut VisualRegistry) -> Option<MeasurementId> {
        if !record.kind.accepts_point_count(record.points.len()) {
            warn!(
                "Skipping stored {:?} measurement {} with {} point(s)",
                record.kind,
                record.id,
                record.points.len()
            );
            return None;
        }
        if self.get(&record.id).is_some() {
            warn!("Skipping duplicate measurement id {}", record.id);
            return None;
        }
        let measurement = Measurement::from_record(record);
        let id = measurement.id.clone();
        self.insert(measurement, registry);
        Some(id)
    }

    fn insert(&mut self, measurement: Measurement, registry: &mut VisualRegistry) {
        let visuals = self.build_visuals(&measurement, registry);
        self.visuals.insert(measurement.id.clone(), visuals);
        self.measurements.push(measurement);
    }

    fn build_visuals(&mut self, m: &Measurement, registry: &mut VisualRegistry) -> MeasurementVisuals {
        let material = marker_material(m.edit_mode);
        let markers: Vec<VisualId> = m
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let id = registry.spawn(Visual::marker(p.position, material));
                self.owners.insert(
                    id,
                    MarkerOwner {
                        measurement_id: m.id.clone(),
                        point_index: i,
                    },
                );
                id
            })
            .collect();

        let mut visuals = MeasurementVisuals {
            markers,
            ..Default::default()
        };
        self.spawn_derived(m, &mut visuals, registry);

        if !m.visible {
            for id in visuals.ids() {
                registry.set_visible(id, false);
            }
        }
        visuals
    }

    /// Lines, fill and label; everything that depends on point positions
    fn spawn_derived(&self, m: &Measurement, visuals: &mut MeasurementVisuals, registry: &mut VisualRegistry) {
        let positions = m.positions();
        visuals.lines = m
            .segments()
            .into_iter()
            .map(|(a, b)| registry.spawn(Visual::line(positions[a], positions[b], LineStyle::Solid)))
            .collect();
        if m.kind == MeasurementKind::Area {
            visuals.fill = Some(registry.spawn(Visual::fill(positions.clone(), false)));
        }
        visuals.label = Some(registry.spawn(Visual::label(
            m.label_anchor(),
            m.label_text(self.inclination_threshold),
        )));
        if !m.visible {
            for id in visuals.lines.iter().chain(visuals.fill.iter()).chain(visuals.label.iter()) {
                registry.set_visible(*id, false);
            }
        }
    }

    fn rebuild_derived(&mut self, id: &str, registry: &mut VisualRegistry) {
        let Some(mut visuals) = self.visuals.remove(id) else {
            return;
        };
        visuals.dispose_derived(registry);
        if let Some(m) = self.get(id) {
            for (marker, point) in visuals.markers.iter().zip(m.points()) {
                registry.set_marker_position(*marker, point.position);
            }
            self.spawn_derived(m, &mut visuals, registry);
        }
        self.visuals.insert(id.to_string(), visuals);
    }

    fn rebuild_all(&mut self, id: &str, registry: &mut VisualRegistry) {
        self.release_visuals(id, registry);
        let Some(m) = self.get(id).cloned() else {
            return;
        };
        let visuals = self.build_visuals(&m, registry);
        self.visuals.insert(m.id, visuals);
    }

    fn release_visuals(&mut self, id: &str, registry: &mut VisualRegistry) {
        if let Some(visuals) = self.visuals.remove(id) {
            for marker in &visuals.markers {
                self.owners.remove(marker);
            }
            visuals.dispose(registry);
        }
    }

    /// Merge the given fields; point changes recompute the value and rebuild visuals
    pub fn update(&mut self, id: &str, update: MeasurementUpdate, registry: &mut VisualRegistry) -> bool {
        let Some(m) = self.get_mut(id) else {
            warn!("Update for unknown measurement {}", id);
            return false;
        };
        if let Some(points) = &update.points {
            if !m.kind.accepts_point_count(points.len()) {
                warn!(
                    "Rejected update of {}: {:?} cannot hold {} points",
                    id,
                    m.kind,
                    points.len()
                );
                return false;
            }
        }
        if let Some(description) = update.description {
            m.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(points) = update.points {
            m.set_points(points);
            self.rebuild_all(id, registry);
        }
        if let Some(visible) = update.visible {
            self.set_visibility(id, visible, registry);
        }
        if let Some(edit_mode) = update.edit_mode {
            self.set_edit_mode(id, edit_mode, registry);
        }
        true
    }

    /// Move one point; value, lines, label and area fill follow
    pub fn update_point_position(
        &mut self,
        id: &str,
        point_index: usize,
        position: DVec3,
        registry: &mut VisualRegistry,
    ) -> bool {
        let Some(m) = self.get_mut(id) else {
            warn!("Point update for unknown measurement {}", id);
            return false;
        };
        if !m.set_point(point_index, MeasurementPoint::new(position)) {
            warn!("Point index {} out of range for {}", point_index, id);
            return false;
        }
        self.rebuild_derived(id, registry);
        true
    }

    /// Delete one point, or the whole measurement when it would fall below its minimum
    pub fn delete_single_point(
        &mut self,
        id: &str,
        point_index: usize,
        registry: &mut VisualRegistry,
    ) -> PointDeletion {
        let Some(m) = self.get_mut(id) else {
            return PointDeletion::NotFound;
        };
        if point_index >= m.points().len() {
            return PointDeletion::NotFound;
        }
        let kind = m.kind;
        let min_points = kind.min_points();
        if m.points().len() <= min_points {
            info!(
                "Deleting point {} of {} removes the whole {:?} measurement",
                point_index, id, kind
            );
            self.delete(id, registry);
            return PointDeletion::MeasurementDeleted { kind, min_points };
        }
        m.remove_point(point_index);
        self.rebuild_all(id, registry);
        debug!("Removed point {} of {}", point_index, id);
        PointDeletion::Removed
    }

    /// Remove a measurement and release its visuals
    pub fn delete(&mut self, id: &str, registry: &mut VisualRegistry) -> Option<Measurement> {
        let pos = self.measurements.iter().position(|m| m.id == id)?;
        self.release_visuals(id, registry);
        let removed = self.measurements.remove(pos);
        info!("Deleted measurement {}", id);
        Some(removed)
    }

    /// Remove every measurement; returns how many were removed
    pub fn clear(&mut self, registry: &mut VisualRegistry) -> usize {
        let count = self.measurements.len();
        let ids: Vec<MeasurementId> = self.measurements.drain(..).map(|m| m.id).collect();
        for id in &ids {
            self.release_visuals(id, registry);
        }
        self.owners.clear();
        if count > 0 {
            info!("Cleared {} measurement(s)", count);
        }
        count
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool, registry: &mut VisualRegistry) -> bool {
        let Some(m) = self.get_mut(id) else {
            return false;
        };
        m.visible = visible;
        if let Some(visuals) = self.visuals.get(id) {
            for vid in visuals.ids() {
                registry.set_visible(vid, visible);
            }
        }
        true
    }

    /// Toggle drag input for this measurement's points; markers swap material
    pub fn set_edit_mode(&mut self, id: &str, edit_mode: bool, registry: &mut VisualRegistry) -> bool {
        let Some(m) = self.get_mut(id) else {
            return false;
        };
        m.edit_mode = edit_mode;
        if let Some(visuals) = self.visuals.get(id) {
            for marker in &visuals.markers {
                registry.set_marker_base(*marker, marker_material(edit_mode));
            }
        }
        true
    }

    pub fn set_description(&mut self, id: &str, text: &str) -> bool {
        let Some(m) = self.get_mut(id) else {
            return false;
        };
        let trimmed = text.trim();
        m.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        true
    }
}

fn marker_material(edit_mode: bool) -> MarkerMaterial {
    if edit_mode {
        MarkerMaterial::Editable
    } else {
        MarkerMaterial::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PointRecord;

    fn pts(coords: &[[f64; 3]]) -> Vec<MeasurementPoint> {
        coords.iter().map(|c| MeasurementPoint::new(DVec3::from_array(*c))).collect()
    }

    fn length(store: &mut MeasurementStore, reg: &mut VisualRegistry) -> MeasurementId {
        store.create(
            MeasurementKind::Length,
            pts(&[[0.0, 0.0, 0.0], [3.0, 0.0, 4.0]]),
            reg,
        )
    }

    fn area(store: &mut MeasurementStore, reg: &mut VisualRegistry) -> MeasurementId {
        store.create(
            MeasurementKind::Area,
            pts(&[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 3.0], [0.0, 0.0, 3.0]]),
            reg,
        )
    }

    #[test]
    fn test_create_builds_visuals() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let m = store.get(&id).unwrap();
        assert_eq!(m.value(), 5.0);
        let counts = reg.counts();
        assert_eq!((counts.markers, counts.lines, counts.fills, counts.labels), (2, 1, 0, 1));
        let label = store.visuals_of(&id).unwrap().label.unwrap();
        assert_eq!(reg.label_text(label), Some("5.00 m"));
    }

    #[test]
    fn test_area_has_closed_loop_and_fill() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = area(&mut store, &mut reg);
        assert_eq!(store.get(&id).unwrap().value(), 12.0);
        let counts = reg.counts();
        assert_eq!((counts.markers, counts.lines, counts.fills, counts.labels), (4, 4, 1, 1));
    }

    #[test]
    fn test_update_point_rebuilds_label() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let old_label = store.visuals_of(&id).unwrap().label.unwrap();
        assert!(store.update_point_position(&id, 1, DVec3::new(0.0, 0.0, 2.0), &mut reg));
        let new_label = store.visuals_of(&id).unwrap().label.unwrap();
        assert_ne!(old_label, new_label);
        assert!(!reg.contains(old_label));
        assert_eq!(reg.label_text(new_label), Some("2.00 m"));
        assert_eq!(store.get(&id).unwrap().value(), 2.0);
        assert_eq!(reg.live_count(), 4);
    }

    #[test]
    fn test_update_point_out_of_range() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        assert!(!store.update_point_position(&id, 9, DVec3::ZERO, &mut reg));
        assert!(!store.update_point_position("missing", 0, DVec3::ZERO, &mut reg));
    }

    #[test]
    fn test_delete_point_of_length_cascades() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let outcome = store.delete_single_point(&id, 0, &mut reg);
        assert_eq!(
            outcome,
            PointDeletion::MeasurementDeleted { kind: MeasurementKind::Length, min_points: 2 }
        );
        assert!(store.is_empty());
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn test_delete_point_of_area_keeps_loop() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = area(&mut store, &mut reg);
        assert_eq!(store.delete_single_point(&id, 3, &mut reg), PointDeletion::Removed);
        let m = store.get(&id).unwrap();
        assert_eq!(m.points().len(), 3);
        assert_eq!(m.value(), 6.0);
        let counts = reg.counts();
        assert_eq!((counts.markers, counts.lines, counts.fills, counts.labels), (3, 3, 1, 1));
        // Markers map back to their new indices
        let marker = store.marker_of(&id, 2).unwrap();
        assert_eq!(store.owner_of(marker).unwrap().point_index, 2);
    }

    #[test]
    fn test_delete_point_of_triangle_cascades() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = area(&mut store, &mut reg);
        store.delete_single_point(&id, 0, &mut reg);
        assert!(matches!(
            store.delete_single_point(&id, 0, &mut reg),
            PointDeletion::MeasurementDeleted { .. }
        ));
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn test_edit_mode_round_trip() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let markers = store.visuals_of(&id).unwrap().markers.clone();
        let before: Vec<_> = markers.iter().map(|m| reg.marker_material(*m)).collect();
        store.set_edit_mode(&id, true, &mut reg);
        assert_eq!(reg.marker_material(markers[0]), Some(MarkerMaterial::Editable));
        store.set_edit_mode(&id, false, &mut reg);
        let after: Vec<_> = markers.iter().map(|m| reg.marker_material(*m)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_visibility_hides_all_visuals() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = area(&mut store, &mut reg);
        store.set_visibility(&id, false, &mut reg);
        assert!(reg.iter().all(|(_, e)| !e.visible));
        assert!(store.pickable_markers(false).is_empty());
        store.update_point_position(&id, 0, DVec3::new(0.0, 0.0, -1.0), &mut reg);
        assert!(reg.iter().all(|(_, e)| !e.visible));
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        length(&mut store, &mut reg);
        area(&mut store, &mut reg);
        assert_eq!(store.clear(&mut reg), 2);
        assert_eq!(reg.live_count(), 0);
        assert_eq!(reg.created(), reg.disposed());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let update = MeasurementUpdate {
            description: Some(Some("Wall".into())),
            edit_mode: Some(true),
            ..Default::default()
        };
        assert!(store.update(&id, update, &mut reg));
        let m = store.get(&id).unwrap();
        assert_eq!(m.description.as_deref(), Some("Wall"));
        assert!(m.edit_mode);
        assert!(m.visible);

        let too_few = MeasurementUpdate {
            points: Some(pts(&[[0.0, 0.0, 0.0]])),
            ..Default::default()
        };
        assert!(!store.update(&id, too_few, &mut reg));
        assert_eq!(store.get(&id).unwrap().points().len(), 2);
    }

    #[test]
    fn test_restore_keeps_id_and_recomputes() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let mut record = store.get(&id).unwrap().to_record();
        record.value = 1.0;
        let mut other = MeasurementStore::default();
        let mut other_reg = VisualRegistry::new();
        assert_eq!(other.restore(&record, &mut other_reg), Some(id.clone()));
        assert_eq!(other.get(&id).unwrap().value(), 5.0);
        assert_eq!(other.restore(&record, &mut other_reg), None);
    }

    #[test]
    fn test_restore_rejects_extra_points_on_length() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let mut record = store.get(&id).unwrap().to_record();
        record.points.push(PointRecord::at([1.0, 0.0, 1.0]));

        let mut other = MeasurementStore::default();
        let mut other_reg = VisualRegistry::new();
        assert_eq!(other.restore(&record, &mut other_reg), None);
        assert!(other.get(&id).is_none());
        assert_eq!(other_reg.live_count(), 0);
    }

    #[test]
    fn test_update_rejects_extra_points_on_length() {
        let mut reg = VisualRegistry::new();
        let mut store = MeasurementStore::default();
        let id = length(&mut store, &mut reg);
        let too_many = MeasurementUpdate {
            points: Some(pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]])),
            ..Default::default()
        };
        assert!(!store.update(&id, too_many, &mut reg));
        assert_eq!(store.get(&id).unwrap().points().len(), 2);
        assert_eq!(store.get(&id).unwrap().value(), 5.0);
        assert_eq!(
            store.delete_single_point(&id, 0, &mut reg),
            PointDeletion::MeasurementDeleted { kind: MeasurementKind::Length, min_points: 2 }
        );
    }
}
