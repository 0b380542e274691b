//! One block, end to end: rectangle → grid → filter → (compact) → (renumber).
//!
//! Every knob lives in `PipelineCfg`; nothing is read from globals. Geographic
//! boundaries get their rectangle in a local tangent plane (meters) about the
//! ring centroid; the corners are mapped back to lon/lat and the grid is then
//! stepped geodesically.

use crate::error::{LayoutError, Result};
use crate::filter::filter_to_boundary;
use crate::frame::{CoordSystem, LengthUnit, LocalTangentPlane};
use crate::geom2::{GeomCfg, Ring};
use crate::grid::{generate_grid, AdvanceAxis, GridParams, RowFill};
use crate::mabr::{minimum_area_rectangle, OrientedRectangle};
use crate::points::{BlockTag, PointCollection};
use crate::renumber::{compact_rows, renumber, RenumberCfg};

/// How the covering rectangle is oriented.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RectangleMode {
    /// Rotating-calipers minimum-area rectangle; rows advance along its long side.
    #[default]
    MinimumArea,
    /// Rows run along this compass bearing (degrees).
    FixedBearing(f64),
}

/// Pipeline configuration.
///
/// - `row_spacing` and a `RowFill::Spacing` value are given in `unit`.
/// - Planar coordinates are assumed to be in `planar_unit`; geographic runs
///   always measure in meters.
/// - `eps` holds tolerances in run coordinates (degrees for geographic input).
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineCfg {
    pub coords: CoordSystem,
    pub row_spacing: f64,
    pub fill: RowFill,
    pub unit: LengthUnit,
    pub planar_unit: LengthUnit,
    pub orientation: RectangleMode,
    pub compact_rows: bool,
    pub renumber: Option<RenumberCfg>,
    pub eps: GeomCfg,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            coords: CoordSystem::Planar,
            row_spacing: 2.4,
            fill: RowFill::Spacing(1.5),
            unit: LengthUnit::Meters,
            planar_unit: LengthUnit::Meters,
            orientation: RectangleMode::MinimumArea,
            compact_rows: false,
            renumber: None,
            eps: GeomCfg::default(),
        }
    }
}

impl PipelineCfg {
    /// Defaults for `(lon, lat)` input.
    pub fn geographic() -> Self {
        Self {
            coords: CoordSystem::Geographic,
            eps: GeomCfg::geographic(),
            ..Self::default()
        }
    }

    /// Grid parameters with spacings converted into the frame's unit.
    pub fn grid_params(&self) -> Result<GridParams> {
        let fill = match self.fill {
            RowFill::Spacing(s) => RowFill::Spacing(self.to_frame_units(s)),
            count => count,
        };
        let advance = match self.orientation {
            RectangleMode::MinimumArea => AdvanceAxis::LongestEdge,
            RectangleMode::FixedBearing(_) => AdvanceAxis::Edge(3),
        };
        let params = GridParams {
            row_spacing: self.to_frame_units(self.row_spacing),
            fill,
            advance,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if let RectangleMode::FixedBearing(b) = self.orientation {
            if !b.is_finite() {
                return Err(LayoutError::spacing(format!("row bearing must be finite, got {b}")));
            }
        }
        self.grid_params().map(|_| ())
    }

    fn to_frame_units(&self, v: f64) -> f64 {
        match self.coords {
            CoordSystem::Planar => self.unit.convert(v, self.planar_unit),
            CoordSystem::Geographic => self.unit.to_meters(v),
        }
    }
}

/// Result of one block run.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockLayout {
    pub points: PointCollection,
    /// Covering rectangle, in run coordinates.
    pub rect: OrientedRectangle,
}

/// Covering rectangle of `boundary` in run coordinates.
pub fn covering_rectangle(boundary: &Ring, cfg: &PipelineCfg) -> Result<OrientedRectangle> {
    let planar = |ring: &Ring, eps: &GeomCfg| match cfg.orientation {
        RectangleMode::MinimumArea => minimum_area_rectangle(ring, eps),
        RectangleMode::FixedBearing(b) => OrientedRectangle::enclosing_at_bearing(ring, b),
    };
    match cfg.coords {
        CoordSystem::Planar => planar(boundary, &cfg.eps),
        CoordSystem::Geographic => {
            let ltp = LocalTangentPlane::new(boundary.centroid());
            let local = boundary.map(|p| ltp.project(p));
            let rect = planar(&local, &GeomCfg::default())?;
            Ok(rect.map_corners(|q| ltp.unproject(q)))
        }
    }
}

/// Generate the plant points of one block.
pub fn run_block(boundary: &Ring, block: &BlockTag, cfg: &PipelineCfg) -> Result<BlockLayout> {
    cfg.validate()?;
    let params = cfg.grid_params()?;
    let _span = tracing::debug_span!("run_block", block = ?block.id).entered();

    let rect = covering_rectangle(boundary, cfg)?;
    tracing::debug!(area = rect.area, angle_deg = rect.angle_deg(), "rectangle");

    let candidates = generate_grid(&rect, &params, &cfg.coords)?;
    let mut points = filter_to_boundary(boundary, &candidates, cfg.eps.eps_contain);
    tracing::debug!(candidates = candidates.len(), kept = points.len(), "filtered");

    points = PointCollection {
        points: points.into_iter().map(|p| p.in_block(block)).collect(),
        block_id: block.id.clone(),
    };
    if cfg.compact_rows {
        points = compact_rows(&points);
    }
    if let Some(rc) = &cfg.renumber {
        points = renumber(&points, rc)?;
    }
    Ok(BlockLayout { points, rect })
}
