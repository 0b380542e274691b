//! Vineyard plant-point layout.
//!
//! Given a block boundary, cover it with a minimum-area (or fixed-bearing)
//! rectangle, lay out rows of candidate plant points over the rectangle, keep
//! the ones inside the real boundary and renumber them deterministically.
//!
//! Layout
//! - `geom2`: rings, hull, containment, random test blocks.
//! - `frame`: planar vs geodesic distance/bearing/destination.
//! - `mabr`: rotating-calipers rectangle.
//! - `grid`, `filter`, `renumber`: the point stages.
//! - `pipeline`: one block end to end from a `PipelineCfg`.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   is the curated surface the CLI builds on.

pub mod api;
pub mod error;
pub mod filter;
pub mod frame;
pub mod geom2;
pub mod grid;
pub mod mabr;
pub mod pipeline;
pub mod points;
pub mod renumber;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{LayoutError, Result};
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::frame::{CoordSystem, Frame, LengthUnit};
    pub use crate::geom2::{GeomCfg, Ring};
    pub use crate::grid::RowFill;
    pub use crate::pipeline::{run_block, BlockLayout, PipelineCfg, RectangleMode};
    pub use crate::points::{BlockTag, PlantPoint, PointCollection};
    pub use crate::renumber::RenumberCfg;
    pub use nalgebra::Vector2 as Vec2;
}
