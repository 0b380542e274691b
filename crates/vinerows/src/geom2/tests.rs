use super::*;
use crate::error::LayoutError;
use nalgebra::{vector, Vector2};

fn square(side: f64) -> Ring {
    Ring::from_xy(&[[0.0, 0.0], [side, 0.0], [side, side], [0.0, side]]).unwrap()
}

#[test]
fn ring_strips_closing_vertex() {
    let r = Ring::from_xy(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap();
    assert_eq!(r.vertices().len(), 3);
    assert_eq!(r.closed().len(), 4);
    assert_eq!(r.closed()[3], r.vertices()[0]);
}

#[test]
fn ring_rejects_two_points() {
    let err = Ring::from_xy(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]).unwrap_err();
    assert!(matches!(err, LayoutError::DegenerateGeometry { .. }));
}

#[test]
fn ring_centroid_of_square() {
    let c = square(4.0).centroid();
    assert!((c - vector![2.0, 2.0]).norm() < 1e-12);
}

#[test]
fn hull_starts_lowest_y_ccw_and_drops_interior() {
    let pts = vec![
        Vector2::new(2.0, 2.0),
        Vector2::new(0.0, 1.0),
        Vector2::new(1.0, 1.0), // interior
        Vector2::new(2.0, 0.0),
        Vector2::new(1.0, 0.0), // collinear on bottom edge
        Vector2::new(0.0, 0.0),
        Vector2::new(0.0, 0.0), // duplicate
        Vector2::new(0.0, 2.0),
    ];
    let hull = convex_hull(&pts, 1e-12).unwrap();
    assert_eq!(
        hull,
        vec![
            vector![0.0, 0.0],
            vector![2.0, 0.0],
            vector![2.0, 2.0],
            vector![0.0, 2.0]
        ]
    );
    assert!(signed_area(&hull) > 0.0);
}

#[test]
fn hull_canonical_start_breaks_y_ties_by_x() {
    // Diamond-ish: two vertices share the minimum y.
    let pts = vec![
        Vector2::new(3.0, 0.0),
        Vector2::new(4.0, 2.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 2.0),
    ];
    let hull = convex_hull(&pts, 1e-12).unwrap();
    assert_eq!(hull[0], vector![1.0, 0.0]);
    assert_eq!(hull[1], vector![3.0, 0.0]);
}

#[test]
fn hull_of_collinear_points_is_degenerate() {
    let pts: Vec<_> = (0..5).map(|k| Vector2::new(k as f64, 2.0 * k as f64)).collect();
    assert!(matches!(
        convex_hull(&pts, 1e-12),
        Err(LayoutError::DegenerateGeometry { .. })
    ));
    let same = vec![Vector2::new(1.0, 1.0); 4];
    assert!(convex_hull(&same, 1e-12).is_err());
}

#[test]
fn containment_is_boundary_inclusive() {
    let sq = square(10.0);
    let t = BoundaryTest::new(&sq, 1e-9);
    assert!(t.contains(vector![5.0, 5.0]));
    assert!(t.contains(vector![0.0, 0.0]));
    assert!(t.contains(vector![10.0, 5.0]));
    assert!(!t.contains(vector![10.5, 5.0]));
    // Float noise just outside an edge is absorbed by eps.
    assert!(t.contains(vector![10.0 + 1e-12, 5.0]));
    assert!(!contains_point(&sq, vector![10.0 + 1e-12, 5.0], 0.0));
}

#[test]
fn containment_respects_concavity() {
    // L-shape: the notch (7, 7) is outside.
    let l = Ring::from_xy(&[
        [0.0, 0.0],
        [10.0, 0.0],
        [10.0, 4.0],
        [4.0, 4.0],
        [4.0, 10.0],
        [0.0, 10.0],
    ])
    .unwrap();
    assert!(contains_point(&l, vector![2.0, 8.0], 1e-9));
    assert!(contains_point(&l, vector![8.0, 2.0], 1e-9));
    assert!(!contains_point(&l, vector![7.0, 7.0], 1e-9));
}

#[test]
fn segment_distance_clamps_to_endpoints() {
    let a = vector![0.0, 0.0];
    let b = vector![2.0, 0.0];
    assert!((segment_distance(vector![1.0, 3.0], a, b) - 3.0).abs() < 1e-12);
    assert!((segment_distance(vector![5.0, 4.0], a, b) - 5.0).abs() < 1e-12);
    assert!((segment_distance(vector![1.0, 1.0], a, a) - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn rotate_about_quarter_turn() {
    let p = rotate_about(vector![2.0, 1.0], vector![1.0, 1.0], std::f64::consts::FRAC_PI_2);
    assert!((p - vector![1.0, 2.0]).norm() < 1e-12);
    assert!(cross(vector![0.0, 0.0], vector![1.0, 0.0], p) > 0.0);
}

#[test]
fn ring_area_ignores_orientation() {
    let ccw = square(3.0);
    let cw = Ring::from_xy(&[[0.0, 0.0], [0.0, 3.0], [3.0, 3.0], [3.0, 0.0]]).unwrap();
    assert_eq!(ring_area(&ccw), 9.0);
    assert_eq!(ring_area(&cw), 9.0);
    assert!(signed_area(cw.vertices()) < 0.0);
}
