//! Boundary-inclusive point-in-polygon.
//!
//! The interior test is `geo`'s coordinate position (even-odd on the ring).
//! On top of it, any point within `eps` of an edge counts as on the boundary,
//! so candidates stepped exactly onto an edge survive float noise.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use nalgebra::Vector2;

use super::types::Ring;
use super::util::segment_distance;

/// Prepared containment test for one ring.
#[derive(Clone, Debug)]
pub struct BoundaryTest {
    ring: Ring,
    poly: geo::Polygon<f64>,
    eps: f64,
}

impl BoundaryTest {
    pub fn new(ring: &Ring, eps: f64) -> Self {
        Self {
            ring: ring.clone(),
            poly: ring.to_geo(),
            eps: eps.max(0.0),
        }
    }

    /// True for interior points and points on (or within `eps` of) the boundary.
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        match self.poly.coordinate_position(&geo::Coord { x: p.x, y: p.y }) {
            CoordPos::Inside | CoordPos::OnBoundary => true,
            CoordPos::Outside => self.near_boundary(p),
        }
    }

    fn near_boundary(&self, p: Vector2<f64>) -> bool {
        self.eps > 0.0
            && self
                .ring
                .edges()
                .any(|(a, b)| segment_distance(p, a, b) <= self.eps)
    }
}

/// One-shot form of `BoundaryTest::contains`.
pub fn contains_point(ring: &Ring, p: Vector2<f64>, eps: f64) -> bool {
    BoundaryTest::new(ring, eps).contains(p)
}
