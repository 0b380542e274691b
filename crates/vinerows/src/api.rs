//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI and
//!   benches. Breaking changes are allowed and expected.

// Errors
pub use crate::error::{LayoutError, Result};
// 2D geometry
pub use crate::geom2::{
    contains_point, convex_hull, ring_area, segment_distance, BoundaryTest, GeomCfg, Ring,
};
// Random test blocks
pub use crate::geom2::rand::{
    draw_block_radial, draw_convex_block, BlockCfg, ReplayToken as BlockReplay, VertexCount,
};
// Frames and units
pub use crate::frame::{CoordSystem, Frame, Geodesic, LengthUnit, LocalTangentPlane, Planar};
// Point stages
pub use crate::filter::filter_to_boundary;
pub use crate::grid::{
    generate_grid, generate_quad_grid, points_along_polyline, AdvanceAxis, GridParams, RowFill,
};
pub use crate::mabr::{minimum_area_rectangle, OrientedRectangle};
pub use crate::points::{BlockTag, PlantPoint, PointCollection};
pub use crate::renumber::{
    compact_rows, renumber, renumber_with_caps, CapKey, RenumberCfg, RowCaps,
};
// Pipeline
pub use crate::pipeline::{covering_rectangle, run_block, BlockLayout, PipelineCfg, RectangleMode};
