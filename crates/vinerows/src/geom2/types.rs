//! Basic 2D types and tolerances.
//!
//! - `GeomCfg`: centralizes epsilons for hull dedup, containment and area checks.
//! - `Ring`: an implicitly closed boundary ring (≥3 vertices), never mutated.

use nalgebra::Vector2;

use crate::error::{LayoutError, Result};

/// Geometry configuration (tolerances).
///
/// Values are in the coordinate units of the run: meters/feet for planar input,
/// degrees for geographic input. Use `GeomCfg::geographic()` for lon/lat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeomCfg {
    /// Two hull candidates closer than this are one vertex.
    pub eps_dedup: f64,
    /// Points within this distance of a boundary edge count as on the boundary.
    pub eps_contain: f64,
    /// Trial rectangles with area at or below this are degenerate.
    pub eps_area: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_dedup: 1e-9,
            eps_contain: 1e-6,
            eps_area: 1e-12,
        }
    }
}

impl GeomCfg {
    /// Tolerances for `(lon, lat)` degrees: 1e-7° is roughly a centimeter.
    pub fn geographic() -> Self {
        Self {
            eps_dedup: 1e-12,
            eps_contain: 1e-7,
            eps_area: 1e-20,
        }
    }
}

/// Implicitly closed polygon ring.
///
/// Invariants:
/// - At least 3 vertices.
/// - No repeated closing vertex (stripped by `Ring::new`).
/// - Self-intersection is not checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    pts: Vec<Vector2<f64>>,
}

impl Ring {
    /// Build a ring from an open or closed vertex list.
    pub fn new(mut pts: Vec<Vector2<f64>>) -> Result<Self> {
        if pts.len() >= 2 && pts.first() == pts.last() {
            pts.pop();
        }
        if pts.len() < 3 {
            return Err(LayoutError::degenerate(format!(
                "ring needs at least 3 vertices, got {}",
                pts.len()
            )));
        }
        if pts.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(LayoutError::degenerate("ring has non-finite coordinates"));
        }
        Ok(Self { pts })
    }

    /// Convenience constructor from `[x, y]` pairs.
    pub fn from_xy(coords: &[[f64; 2]]) -> Result<Self> {
        Self::new(coords.iter().map(|c| Vector2::new(c[0], c[1])).collect())
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.pts
    }

    /// Vertices with the first repeated at the end.
    pub fn closed(&self) -> Vec<Vector2<f64>> {
        let mut out = self.pts.clone();
        out.push(self.pts[0]);
        out
    }

    /// Edges `(p_k, p_{k+1})`, wrapping.
    pub fn edges(&self) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |k| (self.pts[k], self.pts[(k + 1) % n]))
    }

    /// Area centroid; falls back to the vertex mean for zero-area rings.
    pub fn centroid(&self) -> Vector2<f64> {
        // Relative to the first vertex: lon/lat rings sit far from the origin.
        let o = self.pts[0];
        let mut a = 0.0;
        let mut c = Vector2::zeros();
        for (p, q) in self.edges() {
            let (p, q) = (p - o, q - o);
            let cross = p.x * q.y - q.x * p.y;
            a += cross;
            c += (p + q) * cross;
        }
        if a.abs() < 1e-18 {
            return self.pts.iter().sum::<Vector2<f64>>() / self.pts.len() as f64;
        }
        o + c / (3.0 * a)
    }

    /// Same ring with every vertex mapped through `f`.
    pub fn map(&self, f: impl Fn(Vector2<f64>) -> Vector2<f64>) -> Self {
        Self {
            pts: self.pts.iter().map(|p| f(*p)).collect(),
        }
    }

    pub(crate) fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<geo::Coord<f64>> = self
            .closed()
            .into_iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect();
        geo::Polygon::new(geo::LineString::new(coords), vec![])
    }
}
