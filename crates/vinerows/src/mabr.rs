//! Minimum-area bounding rectangle (rotating calipers).
//!
//! Purpose
//! - Find the smallest-area rectangle enclosing a planar block boundary; its
//!   long side becomes the row-advance axis of the grid generator.
//!
//! Algorithm
//! - Convex hull (CCW, canonical start at lowest-y-then-lowest-x).
//! - For every hull edge in that order: translate by the edge start, rotate by
//!   −angle(edge), take the axis-aligned box of the hull, keep the first strict
//!   minimum area (ties within a relative 1e-9 keep the earlier edge). Map the
//!   winning box back by +angle and the stored origin.
//!
//! Input must be planar; project lon/lat first (`frame::LocalTangentPlane`).

use nalgebra::{Rotation2, Vector2};

use crate::error::{LayoutError, Result};
use crate::geom2::{convex_hull, rotate_about, GeomCfg, Ring};

/// Rectangle with 4 corners in consistent winding.
///
/// Corner order is that of the box in its own frame:
/// `(min_x, max_y), (max_x, max_y), (max_x, min_y), (min_x, min_y)`,
/// i.e. clockwise when the frame is right-handed.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientedRectangle {
    pub corners: [Vector2<f64>; 4],
    /// Rotation of the rectangle frame against +x, radians in (−π, π].
    pub angle: f64,
    pub area: f64,
}

impl OrientedRectangle {
    /// Closed ring: the 4 corners plus the first repeated.
    pub fn ring_coords(&self) -> [Vector2<f64>; 5] {
        let c = self.corners;
        [c[0], c[1], c[2], c[3], c[0]]
    }

    /// The rectangle as an (open) `Ring`.
    pub fn to_ring(&self) -> Result<Ring> {
        Ring::new(self.corners.to_vec())
    }

    /// Orientation angle in degrees.
    #[inline]
    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// `(long, short)` side lengths (planar).
    pub fn sides(&self) -> (f64, f64) {
        let a = (self.corners[1] - self.corners[0]).norm();
        let b = (self.corners[2] - self.corners[1]).norm();
        if a >= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    #[inline]
    pub fn long_side(&self) -> f64 {
        self.sides().0
    }

    #[inline]
    pub fn short_side(&self) -> f64 {
        self.sides().1
    }

    /// Map corners through `f` (e.g. un-projection); angle and area are kept
    /// from the source frame.
    pub fn map_corners(&self, f: impl Fn(Vector2<f64>) -> Vector2<f64>) -> Self {
        Self {
            corners: self.corners.map(f),
            angle: self.angle,
            area: self.area,
        }
    }

    /// Bounding rectangle whose rows run along a fixed compass bearing.
    ///
    /// The ring is rotated about its centroid so that the row bearing points
    /// along +x, boxed, and rotated back. Edge 0 (`c0 → c1`) runs along the
    /// bearing. Grids start at `c3 = (min_x, min_y)` and advance along edge 3
    /// (`grid::AdvanceAxis::Edge(3)`): plants step along the bearing and rows
    /// step to its left, so plant 1 of row 1 is the rear right corner.
    pub fn enclosing_at_bearing(ring: &Ring, bearing_deg: f64) -> Result<Self> {
        // Compass bearing (clockwise from +y) → math angle (CCW from +x).
        let angle = (90.0 - bearing_deg).to_radians();
        let center = ring.centroid();
        let local: Vec<Vector2<f64>> = ring
            .vertices()
            .iter()
            .map(|p| rotate_about(*p, center, -angle))
            .collect();
        let (lo, hi) = aabb(&local);
        let area = (hi.x - lo.x) * (hi.y - lo.y);
        if !(area > 0.0) {
            return Err(LayoutError::degenerate("boundary has zero extent"));
        }
        let corners = box_corners(lo, hi).map(|c| rotate_about(c, center, angle));
        Ok(Self {
            corners,
            angle: wrap_pi(angle),
            area,
        })
    }
}

/// Minimum-area rectangle enclosing `ring` (rotating calipers over its hull).
pub fn minimum_area_rectangle(ring: &Ring, cfg: &GeomCfg) -> Result<OrientedRectangle> {
    let hull = convex_hull(ring.vertices(), cfg.eps_dedup)?;
    minimum_area_rectangle_of_hull(&hull, cfg)
}

/// Rotating calipers over a CCW hull, first strict minimum wins.
pub fn minimum_area_rectangle_of_hull(
    hull: &[Vector2<f64>],
    cfg: &GeomCfg,
) -> Result<OrientedRectangle> {
    if hull.len() < 3 {
        return Err(LayoutError::degenerate("hull needs 3 vertices"));
    }
    let mut best: Option<(f64, [Vector2<f64>; 4], f64, Vector2<f64>)> = None;
    for k in 0..hull.len() {
        let p1 = hull[k];
        let edge = hull[(k + 1) % hull.len()] - p1;
        let angle = edge.y.atan2(edge.x);
        let rot = Rotation2::new(-angle);
        let rotated: Vec<Vector2<f64>> = hull.iter().map(|p| rot * (p - p1)).collect();
        let (lo, hi) = aabb(&rotated);
        let area = (hi.x - lo.x) * (hi.y - lo.y);
        if best
            .as_ref()
            .map_or(true, |(a, ..)| area < *a - tie_slack(*a, cfg))
        {
            best = Some((area, box_corners(lo, hi), angle, p1));
        }
    }
    let (area, local, angle, origin) =
        best.ok_or_else(|| LayoutError::degenerate("empty hull"))?;
    if !(area > cfg.eps_area) {
        return Err(LayoutError::degenerate(format!(
            "minimum rectangle area {area:e} is not positive"
        )));
    }
    let back = Rotation2::new(angle);
    Ok(OrientedRectangle {
        corners: local.map(|c| back * c + origin),
        angle,
        area,
    })
}

/// Congruent trials differ only by rounding; a later trial must beat the
/// current best by more than this to replace it.
#[inline]
fn tie_slack(best: f64, cfg: &GeomCfg) -> f64 {
    cfg.eps_area.max(best.abs() * TIE_REL)
}

const TIE_REL: f64 = 1e-9;

fn aabb(pts: &[Vector2<f64>]) -> (Vector2<f64>, Vector2<f64>) {
    let mut lo = Vector2::repeat(f64::INFINITY);
    let mut hi = Vector2::repeat(f64::NEG_INFINITY);
    for p in pts {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (lo, hi)
}

#[inline]
fn box_corners(lo: Vector2<f64>, hi: Vector2<f64>) -> [Vector2<f64>; 4] {
    [
        Vector2::new(lo.x, hi.y),
        Vector2::new(hi.x, hi.y),
        Vector2::new(hi.x, lo.y),
        Vector2::new(lo.x, lo.y),
    ]
}

#[inline]
fn wrap_pi(a: f64) -> f64 {
    let mut x = a;
    while x <= -std::f64::consts::PI {
        x += std::f64::consts::TAU;
    }
    while x > std::f64::consts::PI {
        x -= std::f64::consts::TAU;
    }
    x
}
