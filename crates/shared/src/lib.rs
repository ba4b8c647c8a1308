use serde::{Deserialize, Serialize};

/// Unique identifier of a measurement
pub type MeasurementId = String;

/// Unique identifier of a stored project
pub type ProjectId = String;

/// Current on-disk / on-wire snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Kind of a finalized measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Point-to-point distance
    Length,
    /// Vertical difference between two points
    Height,
    /// Horizontal-plane area of a closed polygon
    Area,
}

impl MeasurementKind {
    /// Unit suffix of the computed value
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Length | Self::Height => "m",
            Self::Area => "m²",
        }
    }

    /// Minimum number of points a measurement of this kind can hold
    pub fn min_points(&self) -> usize {
        match self {
            Self::Length | Self::Height => 2,
            Self::Area => 3,
        }
    }

    /// Fixed point count for two-point kinds; areas are open-ended
    pub fn max_points(&self) -> Option<usize> {
        match self {
            Self::Length | Self::Height => Some(2),
            Self::Area => None,
        }
    }

    pub fn accepts_point_count(&self, count: usize) -> bool {
        match self.max_points() {
            Some(max) => count == max,
            None => count >= self.min_points(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Length => "Length",
            Self::Height => "Height",
            Self::Area => "Area",
        }
    }

    pub fn all() -> &'static [MeasurementKind] {
        &[Self::Length, Self::Height, Self::Area]
    }
}

/// A captured point: local position plus its world-space copy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: [f64; 3],
    pub world: [f64; 3],
}

impl PointRecord {
    /// Point whose world copy equals its position (identity model transform)
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            world: position,
        }
    }
}

/// Plain-data form of a measurement, free of any renderable handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: MeasurementId,
    pub kind: MeasurementKind,
    pub points: Vec<PointRecord>,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclination: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Serializable list of measurements for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSnapshot {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub measurements: Vec<MeasurementRecord>,
}

impl Default for MeasurementSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            model: None,
            measurements: Vec::new(),
        }
    }
}

impl MeasurementSnapshot {
    pub fn new(model: Option<String>, measurements: Vec<MeasurementRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            model,
            measurements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn count_of(&self, kind: MeasurementKind) -> usize {
        self.measurements.iter().filter(|m| m.kind == kind).count()
    }
}

/// One line of an exported measurement report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub description: String,
    pub kind: MeasurementKind,
    pub value: f64,
    pub unit: String,
    /// Present only when the inclination is significant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclination: Option<f64>,
}

/// Finalized measurement list handed to report writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub title: String,
    pub rows: Vec<ExportRow>,
}

// ── Project DTOs (persistence server) ──────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub measurement_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: MeasurementKind) -> MeasurementRecord {
        MeasurementRecord {
            id: "m1".to_string(),
            kind,
            points: vec![PointRecord::at([0.0, 0.0, 0.0]), PointRecord::at([3.0, 0.0, 4.0])],
            value: 5.0,
            unit: kind.unit().to_string(),
            inclination: None,
            description: None,
            visible: true,
        }
    }

    #[test]
    fn test_kind_serde_snake_case() {
        let json = serde_json::to_string(&MeasurementKind::Height).unwrap();
        assert_eq!(json, "\"height\"");
        let kind: MeasurementKind = serde_json::from_str("\"area\"").unwrap();
        assert_eq!(kind, MeasurementKind::Area);
    }

    #[test]
    fn test_kind_units_and_min_points() {
        assert_eq!(MeasurementKind::Length.unit(), "m");
        assert_eq!(MeasurementKind::Area.unit(), "m²");
        assert_eq!(MeasurementKind::Height.min_points(), 2);
        assert_eq!(MeasurementKind::Area.min_points(), 3);
        assert_eq!(MeasurementKind::Length.max_points(), Some(2));
        assert_eq!(MeasurementKind::Area.max_points(), None);
    }

    #[test]
    fn test_point_count_bounds() {
        assert!(MeasurementKind::Length.accepts_point_count(2));
        assert!(!MeasurementKind::Length.accepts_point_count(3));
        assert!(!MeasurementKind::Height.accepts_point_count(1));
        assert!(!MeasurementKind::Area.accepts_point_count(2));
        assert!(MeasurementKind::Area.accepts_point_count(12));
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let json = r#"{
            "id": "a",
            "kind": "length",
            "points": [{"position": [0,0,0], "world": [0,0,0]}],
            "value": 1.0,
            "unit": "m"
        }"#;
        let rec: MeasurementRecord = serde_json::from_str(json).unwrap();
        assert!(rec.visible);
        assert!(rec.description.is_none());
        assert!(rec.inclination.is_none());
    }

    #[test]
    fn test_record_skips_empty_optionals() {
        let json = serde_json::to_string(&record(MeasurementKind::Length)).unwrap();
        assert!(!json.contains("inclination"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_snapshot_counts() {
        let snap = MeasurementSnapshot::new(
            Some("site.obj".to_string()),
            vec![
                record(MeasurementKind::Length),
                record(MeasurementKind::Length),
                record(MeasurementKind::Area),
            ],
        );
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.count_of(MeasurementKind::Length), 2);
        assert_eq!(snap.count_of(MeasurementKind::Height), 0);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_missing_measurements_is_empty() {
        let snap: MeasurementSnapshot = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(snap.is_empty());
        assert!(snap.model.is_none());
    }
}
