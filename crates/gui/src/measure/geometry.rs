//! Pure measurement math on `DVec3` points with `+Y` up.
//!
//! Nothing here holds state. Degenerate inputs (too few points, coincident
//! points) return zero rather than failing, since they occur during normal
//! incremental capture.

use glam::DVec3;

use super::types::MeasurementKind;

/// Inclination below this many degrees is hidden from labels and reports
pub const DEFAULT_INCLINATION_THRESHOLD: f64 = 5.0;

/// Pick distance to the first area point that closes the polygon
pub const DEFAULT_CLOSE_THRESHOLD: f64 = 0.2;

/// Euclidean distance between two points
pub fn distance(a: DVec3, b: DVec3) -> f64 {
    a.distance(b)
}

/// Absolute difference along the up axis
pub fn height(a: DVec3, b: DVec3) -> f64 {
    (b.y - a.y).abs()
}

fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Angle between segment `a→b` and the horizontal plane, in degrees rounded to 0.1.
///
/// A pure vertical segment is 90°. Coincident points are 0°.
pub fn inclination(a: DVec3, b: DVec3) -> f64 {
    let rise = (b.y - a.y).abs();
    let run = horizontal_distance(a, b);

    if run == 0.0 {
        return if rise == 0.0 { 0.0 } else { 90.0 };
    }

    let degrees = rise.atan2(run).to_degrees();
    (degrees * 10.0).round() / 10.0
}

/// Area of the polygon projected onto the XZ plane (shoelace).
///
/// Winding and start index do not matter. Fewer than 3 points gives 0.
pub fn polygon_area(points: &[DVec3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice_area += p.x * q.z - q.x * p.z;
    }

    twice_area.abs() * 0.5
}

pub fn is_inclination_significant(angle: f64, threshold: f64) -> bool {
    angle.abs() >= threshold
}

pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

/// Average of the points; origin for an empty slice
pub fn centroid(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}

/// Value of a measurement of `kind` over `points`.
///
/// Returns 0 when there are not enough points for the kind.
pub fn measure(kind: MeasurementKind, points: &[DVec3]) -> f64 {
    match kind {
        MeasurementKind::Length => match points {
            [a, b, ..] => distance(*a, *b),
            _ => 0.0,
        },
        MeasurementKind::Height => match points {
            [a, b, ..] => height(*a, *b),
            _ => 0.0,
        },
        MeasurementKind::Area => polygon_area(points),
    }
}

/// Inclination of the first segment; only length measurements carry one
pub fn measure_inclination(kind: MeasurementKind, points: &[DVec3]) -> Option<f64> {
    match (kind, points) {
        (MeasurementKind::Length, [a, b, ..]) => Some(inclination(*a, *b)),
        _ => None,
    }
}

/// `"5.00 m"`
pub fn format_value(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}

/// `"12.5°"`
pub fn format_inclination(angle: f64) -> String {
    format!("{angle:.1}°")
}

/// Label text: formatted value, plus the inclination for steep length segments
pub fn format_label(
    kind: MeasurementKind,
    value: f64,
    inclination: Option<f64>,
    threshold: f64,
) -> String {
    let base = format_value(value, kind.unit());
    match (kind, inclination) {
        (MeasurementKind::Length, Some(angle)) if is_inclination_significant(angle, threshold) => {
            format!("{base} ∠ {}", format_inclination(angle))
        }
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> DVec3 {
        DVec3::new(x, y, z)
    }

    #[test]
    fn test_distance_3_4_5() {
        assert!((distance(p(0.0, 0.0, 0.0), p(3.0, 0.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_height_ignores_horizontal() {
        assert_eq!(height(p(0.0, 1.0, 0.0), p(10.0, 3.5, -7.0)), 2.5);
        assert_eq!(height(p(10.0, 3.5, -7.0), p(0.0, 1.0, 0.0)), 2.5);
    }

    #[test]
    fn test_inclination_vertical_is_90() {
        assert_eq!(inclination(p(1.0, 0.0, 1.0), p(1.0, 4.0, 1.0)), 90.0);
        assert_eq!(inclination(p(1.0, 4.0, 1.0), p(1.0, 0.0, 1.0)), 90.0);
    }

    #[test]
    fn test_inclination_coincident_is_zero() {
        assert_eq!(inclination(p(1.0, 2.0, 3.0), p(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn test_inclination_45_and_rounding() {
        assert_eq!(inclination(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0)), 45.0);
        // atan(1/3) = 18.43494...
        assert_eq!(inclination(p(0.0, 0.0, 0.0), p(3.0, 1.0, 0.0)), 18.4);
        assert_eq!(inclination(p(0.0, 0.0, 0.0), p(3.0, 0.0, 4.0)), 0.0);
    }

    #[test]
    fn test_polygon_area_unit_square() {
        let square = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-12);
        let mut reversed = square;
        reversed.reverse();
        assert!((polygon_area(&reversed) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_area_drops_height() {
        let tri = [p(0.0, 0.0, 0.0), p(4.0, 2.0, 0.0), p(4.0, 9.0, 3.0)];
        assert!((polygon_area(&tri) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_area_too_few_points() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_significance_threshold_inclusive() {
        assert!(is_inclination_significant(5.0, 5.0));
        assert!(is_inclination_significant(-7.0, 5.0));
        assert!(!is_inclination_significant(4.9, 5.0));
    }

    #[test]
    fn test_measure_dispatch() {
        let pts = [p(0.0, 0.0, 0.0), p(3.0, 4.0, 0.0)];
        assert_eq!(measure(MeasurementKind::Length, &pts), 5.0);
        assert_eq!(measure(MeasurementKind::Height, &pts), 4.0);
        assert_eq!(measure(MeasurementKind::Area, &pts), 0.0);
        assert_eq!(measure(MeasurementKind::Length, &pts[..1]), 0.0);
        assert!(measure_inclination(MeasurementKind::Height, &pts).is_none());
        assert_eq!(measure_inclination(MeasurementKind::Length, &pts), Some(53.1));
    }

    #[test]
    fn test_format_value_two_decimals() {
        assert_eq!(format_value(5.0, "m"), "5.00 m");
        assert_eq!(format_value(6.004, "m²"), "6.00 m²");
        assert_eq!(format_inclination(12.34), "12.3°");
    }

    #[test]
    fn test_format_label_suppresses_small_inclination() {
        let flat = format_label(MeasurementKind::Length, 5.0, Some(0.0), DEFAULT_INCLINATION_THRESHOLD);
        assert_eq!(flat, "5.00 m");
        let steep = format_label(MeasurementKind::Length, 1.41, Some(45.0), DEFAULT_INCLINATION_THRESHOLD);
        assert_eq!(steep, "1.41 m ∠ 45.0°");
        let height = format_label(MeasurementKind::Height, 2.0, Some(90.0), DEFAULT_INCLINATION_THRESHOLD);
        assert_eq!(height, "2.00 m");
    }

    #[test]
    fn test_centroid_and_midpoint() {
        assert_eq!(midpoint(p(0.0, 0.0, 0.0), p(2.0, 4.0, 6.0)), p(1.0, 2.0, 3.0));
        let c = centroid(&[p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(0.0, 0.0, 3.0)]);
        assert_eq!(c, p(1.0, 0.0, 1.0));
        assert_eq!(centroid(&[]), DVec3::ZERO);
    }
}
