//! Plain-data report of the measurement list for report writers.

use std::path::Path;

use shared::{ExportReport, ExportRow};

use crate::measure::geometry::is_inclination_significant;
use crate::measure::Measurement;
use crate::persistence::PersistenceError;

/// Build the report rows; inclination is kept only when significant
pub fn build_report<'a>(
    title: &str,
    measurements: impl IntoIterator<Item = &'a Measurement>,
    inclination_threshold: f64,
) -> ExportReport {
    let rows = measurements
        .into_iter()
        .map(|m| ExportRow {
            description: m.description.clone().unwrap_or_default(),
            kind: m.kind,
            value: round2(m.value()),
            unit: m.unit().to_string(),
            inclination: m
                .inclination()
                .filter(|a| is_inclination_significant(*a, inclination_threshold)),
        })
        .collect();

    ExportReport {
        title: title.to_string(),
        rows,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Write the report as pretty JSON
pub fn save_report(report: &ExportReport, path: &Path) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!("Exported {} row(s) to {:?}", report.rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{MeasurementKind, MeasurementPoint};
    use glam::DVec3;

    fn m(kind: MeasurementKind, coords: &[[f64; 3]]) -> Measurement {
        let points = coords
            .iter()
            .map(|c| MeasurementPoint::new(DVec3::from_array(*c)))
            .collect();
        Measurement::new(format!("{kind:?}"), kind, points)
    }

    #[test]
    fn test_flat_length_has_no_inclination() {
        let list = [m(MeasurementKind::Length, &[[0.0, 0.0, 0.0], [3.0, 0.0, 4.0]])];
        let report = build_report("Site", &list, 5.0);
        assert_eq!(report.title, "Site");
        assert_eq!(report.rows[0].value, 5.0);
        assert_eq!(report.rows[0].unit, "m");
        assert!(report.rows[0].inclination.is_none());
        assert_eq!(report.rows[0].description, "");
    }

    #[test]
    fn test_steep_length_keeps_inclination() {
        let mut steep = m(MeasurementKind::Length, &[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        steep.description = Some("Ramp".into());
        let report = build_report("Site", [&steep], 5.0);
        assert_eq!(report.rows[0].inclination, Some(45.0));
        assert_eq!(report.rows[0].value, 1.41);
        assert_eq!(report.rows[0].description, "Ramp");
    }

    #[test]
    fn test_area_row_unit() {
        let list = [m(
            MeasurementKind::Area,
            &[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 3.0]],
        )];
        let report = build_report("Site", &list, 5.0);
        assert_eq!(report.rows[0].unit, "m²");
        assert_eq!(report.rows[0].value, 6.0);
    }
}
