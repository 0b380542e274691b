//! Planar 2D geometry for block boundaries.
//!
//! Purpose
//! - Rings, tolerances, convex hull, containment and small vector helpers used
//!   by the rectangle solver, the grid generator and the boundary filter.
//! - Everything here is planar: coordinates are treated as `(x, y)` in one
//!   Euclidean frame. Geographic runs go through `frame::LocalTangentPlane`
//!   before anything area- or angle-sensitive happens.
//!
//! Conventions
//! - Hulls are CCW and start at the lowest-y-then-lowest-x vertex.
//! - Containment is boundary-inclusive (see `contain`).

mod contain;
pub mod rand;
mod types;
mod util;

pub use contain::{contains_point, BoundaryTest};
pub use types::{GeomCfg, Ring};
pub use util::{convex_hull, cross, ring_area, rotate_about, segment_distance, signed_area};

#[cfg(test)]
mod tests;
