use glam::DVec3;
use serde::{Deserialize, Serialize};
pub use shared::MeasurementKind;
use shared::{MeasurementId, MeasurementRecord, PointRecord};

use super::geometry;

/// Active measuring tool; `None` is an interaction mode, never a measurement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    None,
    Length,
    Height,
    Area,
}

impl Tool {
    pub fn kind(&self) -> Option<MeasurementKind> {
        match self {
            Tool::None => None,
            Tool::Length => Some(MeasurementKind::Length),
            Tool::Height => Some(MeasurementKind::Height),
            Tool::Area => Some(MeasurementKind::Area),
        }
    }

    /// Points that complete a capture automatically; area is closed by the user
    pub fn required_points(&self) -> Option<usize> {
        match self {
            Tool::Length | Tool::Height => Some(2),
            Tool::None | Tool::Area => None,
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::None, Tool::Length, Tool::Height, Tool::Area]
    }
}

impl From<MeasurementKind> for Tool {
    fn from(kind: MeasurementKind) -> Self {
        match kind {
            MeasurementKind::Length => Tool::Length,
            MeasurementKind::Height => Tool::Height,
            MeasurementKind::Area => Tool::Area,
        }
    }
}

/// A captured surface point and its world-space copy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPoint {
    pub position: DVec3,
    pub world: DVec3,
}

impl MeasurementPoint {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            world: position,
        }
    }
}

impl From<PointRecord> for MeasurementPoint {
    fn from(r: PointRecord) -> Self {
        Self {
            position: DVec3::from_array(r.position),
            world: DVec3::from_array(r.world),
        }
    }
}

impl From<&MeasurementPoint> for PointRecord {
    fn from(p: &MeasurementPoint) -> Self {
        Self {
            position: p.position.to_array(),
            world: p.world.to_array(),
        }
    }
}

/// A finalized measurement.
///
/// `points` and `value` are private so the value can never drift from the
/// points: every point mutation goes through `set_points` / `set_point`.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: MeasurementId,
    pub kind: MeasurementKind,
    points: Vec<MeasurementPoint>,
    value: f64,
    inclination: Option<f64>,
    pub description: Option<String>,
    pub visible: bool,
    pub edit_mode: bool,
}

impl Measurement {
    pub fn new(id: MeasurementId, kind: MeasurementKind, points: Vec<MeasurementPoint>) -> Self {
        let mut m = Self {
            id,
            kind,
            points: Vec::new(),
            value: 0.0,
            inclination: None,
            description: None,
            visible: true,
            edit_mode: false,
        };
        m.set_points(points);
        m
    }

    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn positions(&self) -> Vec<DVec3> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    pub fn inclination(&self) -> Option<f64> {
        self.inclination
    }

    pub fn set_points(&mut self, points: Vec<MeasurementPoint>) {
        self.points = points;
        self.recompute();
    }

    /// Replace one point; returns false when `index` is out of range
    pub fn set_point(&mut self, index: usize, point: MeasurementPoint) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                self.recompute();
                true
            }
            None => false,
        }
    }

    pub fn remove_point(&mut self, index: usize) -> Option<MeasurementPoint> {
        if index >= self.points.len() {
            return None;
        }
        let removed = self.points.remove(index);
        self.recompute();
        Some(removed)
    }

    fn recompute(&mut self) {
        let positions = self.positions();
        self.value = geometry::measure(self.kind, &positions);
        self.inclination = geometry::measure_inclination(self.kind, &positions);
    }

    pub fn label_text(&self, inclination_threshold: f64) -> String {
        geometry::format_label(self.kind, self.value, self.inclination, inclination_threshold)
    }

    /// Where the floating label sits: segment midpoint, or polygon centroid
    pub fn label_anchor(&self) -> DVec3 {
        match (self.kind, self.points.as_slice()) {
            (MeasurementKind::Length | MeasurementKind::Height, [a, b, ..]) => {
                geometry::midpoint(a.position, b.position)
            }
            _ => geometry::centroid(&self.positions()),
        }
    }

    /// Segments as index pairs: open chain, or closed loop for area
    pub fn segments(&self) -> Vec<(usize, usize)> {
        segment_pairs(self.kind, self.points.len())
    }

    pub fn to_record(&self) -> MeasurementRecord {
        MeasurementRecord {
            id: self.id.clone(),
            kind: self.kind,
            points: self.points.iter().map(PointRecord::from).collect(),
            value: self.value,
            unit: self.unit().to_string(),
            inclination: self.inclination,
            description: self.description.clone(),
            visible: self.visible,
        }
    }

    /// Rehydrate from stored data; the value is recomputed from the points
    pub fn from_record(record: &MeasurementRecord) -> Self {
        let points = record.points.iter().copied().map(MeasurementPoint::from).collect();
        let mut m = Self::new(record.id.clone(), record.kind, points);
        m.description = record.description.clone();
        m.visible = record.visible;
        m
    }
}

/// Index pairs of the segments joining `count` points
pub fn segment_pairs(kind: MeasurementKind, count: usize) -> Vec<(usize, usize)> {
    match kind {
        MeasurementKind::Area if count >= 3 => (0..count).map(|i| (i, (i + 1) % count)).collect(),
        _ => (1..count).map(|i| (i - 1, i)).collect(),
    }
}

/// Display row for the measurement list panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRow {
    pub id: MeasurementId,
    pub kind: MeasurementKind,
    pub kind_label: String,
    pub value: f64,
    pub value_text: String,
    pub inclination_text: Option<String>,
    pub description: Option<String>,
    pub point_count: usize,
    pub visible: bool,
    pub edit_mode: bool,
}

impl MeasurementRow {
    pub fn from_measurement(m: &Measurement, inclination_threshold: f64) -> Self {
        Self {
            id: m.id.clone(),
            kind: m.kind,
            kind_label: m.kind.label().to_string(),
            value: m.value(),
            value_text: geometry::format_value(m.value(), m.unit()),
            inclination_text: m
                .inclination()
                .filter(|a| geometry::is_inclination_significant(*a, inclination_threshold))
                .map(geometry::format_inclination),
            description: m.description.clone(),
            point_count: m.points().len(),
            visible: m.visible,
            edit_mode: m.edit_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[[f64; 3]]) -> Vec<MeasurementPoint> {
        coords.iter().map(|c| MeasurementPoint::new(DVec3::from_array(*c))).collect()
    }

    #[test]
    fn test_value_follows_points() {
        let mut m = Measurement::new(
            "a".into(),
            MeasurementKind::Length,
            pts(&[[0.0, 0.0, 0.0], [3.0, 0.0, 4.0]]),
        );
        assert_eq!(m.value(), 5.0);
        assert_eq!(m.inclination(), Some(0.0));
        assert!(m.set_point(1, MeasurementPoint::new(DVec3::new(0.0, 0.0, 2.0))));
        assert_eq!(m.value(), 2.0);
        assert!(!m.set_point(5, MeasurementPoint::new(DVec3::ZERO)));
    }

    #[test]
    fn test_area_segments_closed_loop() {
        assert_eq!(segment_pairs(MeasurementKind::Area, 3), vec![(0, 1), (1, 2), (2, 0)]);
        assert_eq!(segment_pairs(MeasurementKind::Length, 2), vec![(0, 1)]);
        assert_eq!(segment_pairs(MeasurementKind::Area, 2), vec![(0, 1)]);
        assert!(segment_pairs(MeasurementKind::Length, 1).is_empty());
    }

    #[test]
    fn test_record_roundtrip_recomputes_value() {
        let m = Measurement::new(
            "a".into(),
            MeasurementKind::Area,
            pts(&[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 3.0]]),
        );
        let mut record = m.to_record();
        record.value = 999.0;
        let back = Measurement::from_record(&record);
        assert_eq!(back.value(), 6.0);
        assert_eq!(back.id, "a");
        assert!(!back.edit_mode);
    }

    #[test]
    fn test_row_hides_flat_inclination() {
        let m = Measurement::new(
            "a".into(),
            MeasurementKind::Length,
            pts(&[[0.0, 0.0, 0.0], [3.0, 0.0, 4.0]]),
        );
        let row = MeasurementRow::from_measurement(&m, 5.0);
        assert_eq!(row.value_text, "5.00 m");
        assert!(row.inclination_text.is_none());
        assert_eq!(row.point_count, 2);
    }

    #[test]
    fn test_tool_kind_mapping() {
        assert_eq!(Tool::None.kind(), None);
        assert_eq!(Tool::Area.kind(), Some(MeasurementKind::Area));
        assert_eq!(Tool::Height.required_points(), Some(2));
        assert_eq!(Tool::Area.required_points(), None);
        assert_eq!(Tool::from(MeasurementKind::Length), Tool::Length);
    }
}
