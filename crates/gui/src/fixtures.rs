//! Factory functions for creating measurement test data.
//!
//! Records are built with their derived value and inclination already
//! computed, so they look exactly like what a session would save.

use glam::DVec3;
use shared::{MeasurementKind, MeasurementRecord, MeasurementSnapshot, PointRecord};

use crate::measure::{Measurement, MeasurementPoint};

// ── Record factories ────────────────────────────────────────────

/// A record of `kind` through `points`, with value and inclination filled in.
pub fn record(id: &str, kind: MeasurementKind, points: &[[f64; 3]]) -> MeasurementRecord {
    let points = points
        .iter()
        .map(|p| MeasurementPoint::new(DVec3::from_array(*p)))
        .collect();
    Measurement::new(id.to_string(), kind, points).to_record()
}

/// A length between two points.
pub fn length_record(id: &str, a: [f64; 3], b: [f64; 3]) -> MeasurementRecord {
    record(id, MeasurementKind::Length, &[a, b])
}

/// A height between two points.
pub fn height_record(id: &str, a: [f64; 3], b: [f64; 3]) -> MeasurementRecord {
    record(id, MeasurementKind::Height, &[a, b])
}

/// An axis-aligned `w` × `d` rectangle on the ground, first corner at the origin.
pub fn rect_area_record(id: &str, w: f64, d: f64) -> MeasurementRecord {
    record(
        id,
        MeasurementKind::Area,
        &[[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, 0.0, d], [0.0, 0.0, d]],
    )
}

/// A record with a raw point list and no derived values (as an older file might hold).
pub fn raw_record(id: &str, kind: MeasurementKind, points: &[[f64; 3]]) -> MeasurementRecord {
    MeasurementRecord {
        id: id.to_string(),
        kind,
        points: points.iter().map(|p| PointRecord::at(*p)).collect(),
        value: 0.0,
        unit: kind.unit().to_string(),
        inclination: None,
        description: None,
        visible: true,
    }
}

// ── Snapshot factories ──────────────────────────────────────────

/// Wrap records in a snapshot for the named model.
pub fn snapshot(model: &str, records: Vec<MeasurementRecord>) -> MeasurementSnapshot {
    MeasurementSnapshot::new(Some(model.to_string()), records)
}

/// One measurement of every kind: a 5 m length, a 2 m height and a 6 m² area.
pub fn mixed_snapshot(model: &str) -> MeasurementSnapshot {
    snapshot(
        model,
        vec![
            length_record("len", [0.0, 0.0, 0.0], [3.0, 0.0, 4.0]),
            height_record("hgt", [1.0, 0.0, 1.0], [1.0, 2.0, 1.0]),
            rect_area_record("area", 3.0, 2.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_record_has_value() {
        let r = length_record("a", [0.0, 0.0, 0.0], [3.0, 0.0, 4.0]);
        assert!((r.value - 5.0).abs() < 1e-9);
        assert_eq!(r.unit, "m");
    }

    #[test]
    fn test_mixed_snapshot_counts() {
        let s = mixed_snapshot("site");
        assert_eq!(s.measurements.len(), 3);
        assert_eq!(s.count_of(MeasurementKind::Area), 1);
        assert!((s.measurements[2].value - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_record_has_no_value() {
        let r = raw_record("r", MeasurementKind::Length, &[[0.0; 3], [1.0, 0.0, 0.0]]);
        assert_eq!(r.value, 0.0);
        assert_eq!(r.points.len(), 2);
    }
}
