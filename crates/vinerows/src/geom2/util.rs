use nalgebra::{Rotation2, Vector2};

use super::types::Ring;
use crate::error::{LayoutError, Result};

/// Andrew’s monotone chain convex hull.
///
/// Returns the hull in CCW order starting at the lowest-y-then-lowest-x
/// vertex. Collinear, interior and duplicate (within `eps`) points are dropped.
pub fn convex_hull(points: &[Vector2<f64>], eps: f64) -> Result<Vec<Vector2<f64>>> {
    let mut pts: Vec<_> = points.to_vec();
    pts.sort_by(|a, b| {
        match a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal),
            o => o,
        }
    });
    pts.dedup_by(|a, b| (*a - *b).norm() <= eps);
    if pts.len() < 3 {
        return Err(LayoutError::degenerate(format!(
            "{} distinct points, hull needs 3",
            pts.len()
        )));
    }
    let mut lower: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() < 3 {
        return Err(LayoutError::degenerate("points are collinear"));
    }
    let start = canonical_start(&hull);
    hull.rotate_left(start);
    Ok(hull)
}

/// Index of the lowest-y vertex, ties broken by lowest x.
fn canonical_start(hull: &[Vector2<f64>]) -> usize {
    let mut best = 0;
    for (k, p) in hull.iter().enumerate().skip(1) {
        let b = hull[best];
        if p.y < b.y || (p.y == b.y && p.x < b.x) {
            best = k;
        }
    }
    best
}

/// Orientation of `c` relative to the directed line `a → b` (positive = left).
#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Shoelace area; positive for CCW vertex order.
pub fn signed_area(verts: &[Vector2<f64>]) -> f64 {
    let n = verts.len();
    let mut a = 0.0;
    for k in 0..n {
        let p = verts[k];
        let q = verts[(k + 1) % n];
        a += p.x * q.y - q.x * p.y;
    }
    0.5 * a
}

/// Unsigned area of a ring, either orientation.
#[inline]
pub fn ring_area(ring: &Ring) -> f64 {
    signed_area(ring.vertices()).abs()
}

/// Distance from `p` to the closed segment `[a, b]`.
pub fn segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Rotate `p` about `center` by `angle` radians (CCW).
#[inline]
pub fn rotate_about(p: Vector2<f64>, center: Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * (p - center) + center
}
