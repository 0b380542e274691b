//! Distance, bearing and destination behind one abstraction.
//!
//! A run picks its `CoordSystem` once; every stage then measures and steps with
//! the same `Frame`. Mixing planar and geodesic formulas inside one run is not
//! expressible through this API.
//!
//! Bearings are compass bearings in degrees, `[0, 360)`, clockwise from north
//! (+y in the planar frame).

use geo::{GeodesicBearing, GeodesicDestination, GeodesicDistance, Point};
use nalgebra::Vector2;

/// Coordinate system of a pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordSystem {
    /// Projected `(x, y)`; distances in the CRS unit.
    #[default]
    Planar,
    /// `(lon, lat)` degrees on WGS84; distances in meters.
    Geographic,
}

/// Metric operations the grid generator steps with.
pub trait Frame {
    fn distance(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64;
    fn bearing(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64;
    fn destination(&self, origin: Vector2<f64>, bearing_deg: f64, distance: f64) -> Vector2<f64>;
}

/// Euclidean frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Planar;

/// WGS84 ellipsoidal frame (Karney's geodesic algorithms via `geo`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Geodesic;

impl Frame for Planar {
    #[inline]
    fn distance(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        planar_distance(a, b)
    }
    #[inline]
    fn bearing(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        let d = b - a;
        normalize_bearing(d.x.atan2(d.y).to_degrees())
    }
    #[inline]
    fn destination(&self, origin: Vector2<f64>, bearing_deg: f64, distance: f64) -> Vector2<f64> {
        let th = bearing_deg.to_radians();
        origin + Vector2::new(th.sin(), th.cos()) * distance
    }
}

impl Frame for Geodesic {
    #[inline]
    fn distance(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        geodesic_distance(a, b)
    }
    #[inline]
    fn bearing(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        normalize_bearing(to_point(a).geodesic_bearing(to_point(b)))
    }
    #[inline]
    fn destination(&self, origin: Vector2<f64>, bearing_deg: f64, distance: f64) -> Vector2<f64> {
        destination_point(origin, bearing_deg, distance)
    }
}

impl Frame for CoordSystem {
    fn distance(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        match self {
            CoordSystem::Planar => Planar.distance(a, b),
            CoordSystem::Geographic => Geodesic.distance(a, b),
        }
    }
    fn bearing(&self, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
        match self {
            CoordSystem::Planar => Planar.bearing(a, b),
            CoordSystem::Geographic => Geodesic.bearing(a, b),
        }
    }
    fn destination(&self, origin: Vector2<f64>, bearing_deg: f64, distance: f64) -> Vector2<f64> {
        match self {
            CoordSystem::Planar => Planar.destination(origin, bearing_deg, distance),
            CoordSystem::Geographic => Geodesic.destination(origin, bearing_deg, distance),
        }
    }
}

#[inline]
fn to_point(p: Vector2<f64>) -> Point<f64> {
    Point::new(p.x, p.y)
}

/// Map any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

#[inline]
pub fn planar_distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (b - a).norm()
}

/// Ellipsoidal distance in meters between two `(lon, lat)` points.
#[inline]
pub fn geodesic_distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    to_point(a).geodesic_distance(&to_point(b))
}

/// Direct geodesic problem: point reached from `origin` after `distance_m` meters.
#[inline]
pub fn destination_point(origin: Vector2<f64>, bearing_deg: f64, distance_m: f64) -> Vector2<f64> {
    let p = to_point(origin).geodesic_destination(bearing_deg, distance_m);
    Vector2::new(p.x(), p.y())
}

/// Initial bearing on a sphere (forward-azimuth formula), degrees in `[0, 360)`.
///
/// Differs from the ellipsoidal azimuth by a small fraction of a degree; it is
/// not the inverse of `destination_point`, use `Geodesic::bearing` for stepping.
pub fn spherical_bearing(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let dlon = (b.x - a.x).to_radians();
    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_bearing(x.atan2(y).to_degrees())
}

/// Mean Earth radius (IUGG), meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equirectangular projection about a reference `(lon, lat)`, output in meters.
///
/// Spherical, so lengths are off by a few parts in 10³ against the ellipsoid
/// over block-sized extents (a few km). Good enough to pick the
/// rectangle orientation for geographic input; stepping stays geodesic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTangentPlane {
    origin: Vector2<f64>,
    cos_lat: f64,
}

impl LocalTangentPlane {
    pub fn new(origin: Vector2<f64>) -> Self {
        Self {
            origin,
            cos_lat: origin.y.to_radians().cos(),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vector2<f64> {
        self.origin
    }

    /// `(lon, lat)` → local `(east, north)` meters.
    #[inline]
    pub fn project(&self, p: Vector2<f64>) -> Vector2<f64> {
        let d = p - self.origin;
        Vector2::new(
            d.x.to_radians() * self.cos_lat * EARTH_RADIUS_M,
            d.y.to_radians() * EARTH_RADIUS_M,
        )
    }

    /// Local `(east, north)` meters → `(lon, lat)`.
    #[inline]
    pub fn unproject(&self, q: Vector2<f64>) -> Vector2<f64> {
        let lon = (q.x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees();
        let lat = (q.y / EARTH_RADIUS_M).to_degrees();
        self.origin + Vector2::new(lon, lat)
    }
}

/// Unit of user-facing spacing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthUnit {
    #[default]
    Meters,
    Feet,
}

impl LengthUnit {
    pub const METERS_PER_FOOT: f64 = 0.3048;

    #[inline]
    pub fn to_meters(self, v: f64) -> f64 {
        match self {
            LengthUnit::Meters => v,
            LengthUnit::Feet => v * Self::METERS_PER_FOOT,
        }
    }

    /// Express `v` (in `self`) in `target` units.
    #[inline]
    pub fn convert(self, v: f64, target: LengthUnit) -> f64 {
        let m = self.to_meters(v);
        match target {
            LengthUnit::Meters => m,
            LengthUnit::Feet => m / Self::METERS_PER_FOOT,
        }
    }
}
