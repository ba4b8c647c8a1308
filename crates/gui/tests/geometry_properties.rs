//! Property tests for the measurement geometry.

use glam::DVec3;
use proptest::prelude::*;
use tapeline_gui_lib::measure::geometry::{distance, height, inclination, polygon_area};

fn coord() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn point() -> impl Strategy<Value = DVec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn polygon() -> impl Strategy<Value = Vec<DVec3>> {
    prop::collection::vec(point(), 3..12)
}

/// Loose enough for shoelace sums whose terms reach 1e6 and cancel
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in point(), b in point()) {
        prop_assert!(close(distance(a, b), distance(b, a)));
        prop_assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn height_is_symmetric(a in point(), b in point()) {
        prop_assert_eq!(height(a, b), height(b, a));
        prop_assert!(height(a, b) >= 0.0);
    }

    #[test]
    fn vertical_segment_is_ninety_degrees(x in coord(), z in coord(), y0 in coord(), dy in 0.001..500.0f64) {
        let a = DVec3::new(x, y0, z);
        let b = DVec3::new(x, y0 + dy, z);
        prop_assert_eq!(inclination(a, b), 90.0);
        prop_assert_eq!(inclination(b, a), 90.0);
    }

    #[test]
    fn inclination_stays_in_range(a in point(), b in point()) {
        let angle = inclination(a, b);
        prop_assert!((0.0..=90.0).contains(&angle));
    }

    #[test]
    fn area_ignores_winding(points in polygon()) {
        let mut reversed = points.clone();
        reversed.reverse();
        prop_assert!(close(polygon_area(&points), polygon_area(&reversed)));
    }

    #[test]
    fn area_ignores_start_index(points in polygon(), shift in 0usize..12) {
        let mut rotated = points.clone();
        let n = rotated.len();
        rotated.rotate_left(shift % n);
        prop_assert!(close(polygon_area(&points), polygon_area(&rotated)));
    }
}

#[test]
fn unit_square_from_any_corner() {
    let square = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 1.0),
        DVec3::new(0.0, 0.0, 1.0),
    ];
    for start in 0..4 {
        let mut pts = square.to_vec();
        pts.rotate_left(start);
        assert_eq!(polygon_area(&pts), 1.0);
        pts.reverse();
        assert_eq!(polygon_area(&pts), 1.0);
    }
}
