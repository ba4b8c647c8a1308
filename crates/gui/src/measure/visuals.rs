//! Arena of renderable measurement primitives.
//!
//! Measurements and the capture state hold `VisualId` handles only; the
//! registry owns the primitives. Every handle must be passed back to
//! `dispose` when it is dropped, and the created/disposed counters let tests
//! check that nothing leaks.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::Serialize;

/// Handle to a renderable in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VisualId(u64);

impl VisualId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerMaterial {
    Standard,
    /// Marker of a measurement in edit mode; accepts drag input
    Editable,
    Hovered,
    /// Marker of an in-progress capture
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    /// Live line from the last captured point to the cursor
    Preview,
    /// Live closing edge of an area capture
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    Marker,
    Line,
    Fill,
    Label,
}

/// A renderable primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    Marker {
        position: DVec3,
        material: MarkerMaterial,
        /// Material restored when hover ends
        base: MarkerMaterial,
    },
    Line {
        from: DVec3,
        to: DVec3,
        style: LineStyle,
    },
    Fill {
        outline: Vec<DVec3>,
        preview: bool,
    },
    /// Immutable once spawned: a text change means dispose + spawn
    Label {
        anchor: DVec3,
        text: String,
    },
}

impl Visual {
    pub fn marker(position: DVec3, material: MarkerMaterial) -> Self {
        Visual::Marker {
            position,
            material,
            base: material,
        }
    }

    pub fn line(from: DVec3, to: DVec3, style: LineStyle) -> Self {
        Visual::Line { from, to, style }
    }

    pub fn fill(outline: Vec<DVec3>, preview: bool) -> Self {
        Visual::Fill { outline, preview }
    }

    pub fn label(anchor: DVec3, text: impl Into<String>) -> Self {
        Visual::Label {
            anchor,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> VisualKind {
        match self {
            Visual::Marker { .. } => VisualKind::Marker,
            Visual::Line { .. } => VisualKind::Line,
            Visual::Fill { .. } => VisualKind::Fill,
            Visual::Label { .. } => VisualKind::Label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualEntry {
    pub visual: Visual,
    pub visible: bool,
}

/// Live-object counts, used to assert that operations release what they replace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisualCounts {
    pub markers: usize,
    pub lines: usize,
    pub fills: usize,
    pub labels: usize,
}

impl VisualCounts {
    pub fn total(&self) -> usize {
        self.markers + self.lines + self.fills + self.labels
    }
}

#[derive(Debug, Default)]
pub struct VisualRegistry {
    live: BTreeMap<VisualId, VisualEntry>,
    next_id: u64,
    created: u64,
    disposed: u64,
    version: u64,
}

impl VisualRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, visual: Visual) -> VisualId {
        self.next_id += 1;
        let id = VisualId(self.next_id);
        self.live.insert(
            id,
            VisualEntry {
                visual,
                visible: true,
            },
        );
        self.created += 1;
        self.version += 1;
        id
    }

    /// Release a renderable; returns false for an unknown or already released id
    pub fn dispose(&mut self, id: VisualId) -> bool {
        if self.live.remove(&id).is_some() {
            self.disposed += 1;
            self.version += 1;
            true
        } else {
            false
        }
    }

    pub fn dispose_all<I: IntoIterator<Item = VisualId>>(&mut self, ids: I) {
        for id in ids {
            self.dispose(id);
        }
    }

    pub fn get(&self, id: VisualId) -> Option<&VisualEntry> {
        self.live.get(&id)
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VisualId, &VisualEntry)> {
        self.live.iter().map(|(id, e)| (*id, e))
    }

    pub fn set_marker_position(&mut self, id: VisualId, to: DVec3) {
        if let Some(VisualEntry {
            visual: Visual::Marker { position, .. },
            ..
        }) = self.live.get_mut(&id)
        {
            *position = to;
            self.version += 1;
        }
    }

    /// Change the marker's resting material; a hovered marker keeps its highlight
    pub fn set_marker_base(&mut self, id: VisualId, to: MarkerMaterial) {
        if let Some(VisualEntry {
            visual: Visual::Marker { material, base, .. },
            ..
        }) = self.live.get_mut(&id)
        {
            if *material != MarkerMaterial::Hovered {
                *material = to;
            }
            *base = to;
            self.version += 1;
        }
    }

    pub fn set_hovered(&mut self, id: VisualId, hovered: bool) {
        if let Some(VisualEntry {
            visual: Visual::Marker { material, base, .. },
            ..
        }) = self.live.get_mut(&id)
        {
            *material = if hovered { MarkerMaterial::Hovered } else { *base };
            self.version += 1;
        }
    }

    pub fn marker_material(&self, id: VisualId) -> Option<MarkerMaterial> {
        match self.live.get(&id) {
            Some(VisualEntry {
                visual: Visual::Marker { material, .. },
                ..
            }) => Some(*material),
            _ => None,
        }
    }

    pub fn marker_position(&self, id: VisualId) -> Option<DVec3> {
        match self.live.get(&id) {
            Some(VisualEntry {
                visual: Visual::Marker { position, .. },
                ..
            }) => Some(*position),
            _ => None,
        }
    }

    pub fn label_text(&self, id: VisualId) -> Option<&str> {
        match self.live.get(&id) {
            Some(VisualEntry {
                visual: Visual::Label { text, .. },
                ..
            }) => Some(text),
            _ => None,
        }
    }

    pub fn set_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(entry) = self.live.get_mut(&id) {
            entry.visible = visible;
            self.version += 1;
        }
    }

    pub fn is_visible(&self, id: VisualId) -> bool {
        self.live.get(&id).is_some_and(|e| e.visible)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn counts(&self) -> VisualCounts {
        let mut counts = VisualCounts::default();
        for entry in self.live.values() {
            match entry.visual.kind() {
                VisualKind::Marker => counts.markers += 1,
                VisualKind::Line => counts.lines += 1,
                VisualKind::Fill => counts.fills += 1,
                VisualKind::Label => counts.labels += 1,
            }
        }
        counts
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn disposed(&self) -> u64 {
        self.disposed
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Renderables owned by one finalized measurement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementVisuals {
    /// One per point, same order as the points
    pub markers: Vec<VisualId>,
    pub lines: Vec<VisualId>,
    pub fill: Option<VisualId>,
    pub label: Option<VisualId>,
}

impl MeasurementVisuals {
    pub fn ids(&self) -> impl Iterator<Item = VisualId> + '_ {
        self.markers
            .iter()
            .chain(self.lines.iter())
            .chain(self.fill.iter())
            .chain(self.label.iter())
            .copied()
    }

    /// Release everything except the markers
    pub fn dispose_derived(&mut self, registry: &mut VisualRegistry) {
        registry.dispose_all(self.lines.drain(..));
        if let Some(fill) = self.fill.take() {
            registry.dispose(fill);
        }
        if let Some(label) = self.label.take() {
            registry.dispose(label);
        }
    }

    pub fn dispose(mut self, registry: &mut VisualRegistry) {
        self.dispose_derived(registry);
        registry.dispose_all(self.markers.drain(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_dispose_counts() {
        let mut reg = VisualRegistry::new();
        let a = reg.spawn(Visual::marker(DVec3::ZERO, MarkerMaterial::Standard));
        let b = reg.spawn(Visual::label(DVec3::ZERO, "1.00 m"));
        assert_eq!(reg.live_count(), 2);
        assert!(reg.dispose(a));
        assert!(!reg.dispose(a));
        assert_eq!(reg.created(), 2);
        assert_eq!(reg.disposed(), 1);
        assert_eq!(reg.counts().labels, 1);
        assert_eq!(reg.label_text(b), Some("1.00 m"));
    }

    #[test]
    fn test_hover_restores_base_material() {
        let mut reg = VisualRegistry::new();
        let m = reg.spawn(Visual::marker(DVec3::ZERO, MarkerMaterial::Standard));
        reg.set_hovered(m, true);
        assert_eq!(reg.marker_material(m), Some(MarkerMaterial::Hovered));
        reg.set_marker_base(m, MarkerMaterial::Editable);
        assert_eq!(reg.marker_material(m), Some(MarkerMaterial::Hovered));
        reg.set_hovered(m, false);
        assert_eq!(reg.marker_material(m), Some(MarkerMaterial::Editable));
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let mut reg = VisualRegistry::new();
        let v0 = reg.version();
        let m = reg.spawn(Visual::marker(DVec3::ZERO, MarkerMaterial::Standard));
        reg.set_marker_position(m, DVec3::ONE);
        assert!(reg.version() >= v0 + 2);
        assert_eq!(reg.marker_position(m), Some(DVec3::ONE));
    }

    #[test]
    fn test_measurement_visuals_dispose_all() {
        let mut reg = VisualRegistry::new();
        let visuals = MeasurementVisuals {
            markers: vec![
                reg.spawn(Visual::marker(DVec3::ZERO, MarkerMaterial::Standard)),
                reg.spawn(Visual::marker(DVec3::X, MarkerMaterial::Standard)),
            ],
            lines: vec![reg.spawn(Visual::line(DVec3::ZERO, DVec3::X, LineStyle::Solid))],
            fill: None,
            label: Some(reg.spawn(Visual::label(DVec3::ZERO, "x"))),
        };
        assert_eq!(visuals.ids().count(), 4);
        visuals.dispose(&mut reg);
        assert_eq!(reg.live_count(), 0);
    }
}
