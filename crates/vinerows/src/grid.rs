//! Row/point grid generation over an oriented quadrilateral.
//!
//! Purpose
//! - Lay out candidate plant points covering a whole rectangle; the boundary
//!   filter prunes what falls outside the real block afterwards.
//!
//! Axes
//! - Row-advance axis: by default the longest edge (first maximum), measured
//!   with the run's `Frame`. Rows start on this edge at `r · row_spacing`.
//! - Within-row axis: the edge adjacent to the advance edge's start vertex,
//!   traversed away from it. For a rectangle this is the short side and always
//!   points into the shape.
//!
//! Everything is stepped with `Frame::destination`, so planar and geodesic
//! runs share one code path.

use nalgebra::Vector2;

use crate::error::{LayoutError, Result};
use crate::frame::Frame;
use crate::mabr::OrientedRectangle;
use crate::points::{PlantPoint, PointCollection};

/// Slack for `floor(len / spacing)` so a measured length a few ulps short of
/// an exact multiple does not lose the last row or plant.
const FLOOR_SLACK: f64 = 1e-9;

/// Upper bound on candidate points produced by one grid or row line.
///
/// Tiny spacings over real blocks would otherwise allocate without bound; a
/// request above the limit fails with `InvalidSpacing`.
pub const MAX_CANDIDATES: u64 = 50_000_000;

/// How points are placed along a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowFill {
    /// Exactly `n` points spread evenly over the within-row side.
    Count(u32),
    /// Points every `spacing` units from the row start, as many as fit.
    Spacing(f64),
}

/// Which quadrilateral edge rows advance along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdvanceAxis {
    #[default]
    LongestEdge,
    /// Edge `k` runs from corner `k` to corner `k + 1` (mod 4).
    Edge(usize),
}

/// Grid parameters; distances are in the frame's unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    pub row_spacing: f64,
    pub fill: RowFill,
    pub advance: AdvanceAxis,
}

impl GridParams {
    pub fn new(row_spacing: f64, fill: RowFill) -> Self {
        Self {
            row_spacing,
            fill,
            advance: AdvanceAxis::LongestEdge,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_spacing("row_spacing", self.row_spacing)?;
        match self.fill {
            RowFill::Count(0) => Err(LayoutError::spacing("points_per_row must be >= 1")),
            RowFill::Count(_) => Ok(()),
            RowFill::Spacing(s) => check_spacing("plant_spacing", s),
        }
    }
}

/// `floor(len / spacing)` with slack, checked against `MAX_CANDIDATES`.
fn step_count(len: f64, spacing: f64) -> Result<u32> {
    let steps = (len / spacing + FLOOR_SLACK).floor().max(0.0);
    if !steps.is_finite() || steps >= MAX_CANDIDATES as f64 {
        return Err(LayoutError::spacing(format!(
            "{len} / {spacing} gives more than {MAX_CANDIDATES} steps"
        )));
    }
    Ok(steps as u32)
}

fn check_spacing(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::spacing(format!("{name} must be finite and > 0, got {v}")))
    }
}

/// Resolved stepping axes of a quadrilateral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridAxes {
    pub origin: Vector2<f64>,
    pub advance_bearing: f64,
    pub advance_len: f64,
    pub row_bearing: f64,
    pub row_len: f64,
}

impl GridAxes {
    pub fn resolve<F: Frame + ?Sized>(
        corners: &[Vector2<f64>; 4],
        advance: AdvanceAxis,
        frame: &F,
    ) -> Self {
        let lens: [f64; 4] =
            std::array::from_fn(|k| frame.distance(corners[k], corners[(k + 1) % 4]));
        let k = match advance {
            AdvanceAxis::LongestEdge => {
                let mut best = 0;
                for (i, l) in lens.iter().enumerate().skip(1) {
                    if *l > lens[best] {
                        best = i;
                    }
                }
                best
            }
            AdvanceAxis::Edge(k) => k % 4,
        };
        let origin = corners[k];
        let next = corners[(k + 1) % 4];
        let prev = corners[(k + 3) % 4];
        Self {
            origin,
            advance_bearing: frame.bearing(origin, next),
            advance_len: lens[k],
            row_bearing: frame.bearing(origin, prev),
            row_len: lens[(k + 3) % 4],
        }
    }

    /// `floor(advance_len / row_spacing)`; zero is a valid, empty grid.
    pub fn num_rows(&self, row_spacing: f64) -> Result<u32> {
        step_count(self.advance_len, row_spacing)
    }
}

/// Candidate points covering `rect`.
pub fn generate_grid<F: Frame + ?Sized>(
    rect: &OrientedRectangle,
    params: &GridParams,
    frame: &F,
) -> Result<PointCollection> {
    generate_quad_grid(&rect.corners, params, frame)
}

/// Candidate points covering any quadrilateral given by its 4 corners in order.
pub fn generate_quad_grid<F: Frame + ?Sized>(
    corners: &[Vector2<f64>; 4],
    params: &GridParams,
    frame: &F,
) -> Result<PointCollection> {
    params.validate()?;
    let axes = GridAxes::resolve(corners, params.advance, frame);
    let num_rows = axes.num_rows(params.row_spacing)?;
    let (per_row, step) = match params.fill {
        RowFill::Count(1) => (1, 0.0),
        RowFill::Count(n) => (n, axes.row_len / f64::from(n - 1)),
        RowFill::Spacing(s) => (step_count(axes.row_len, s)? + 1, s),
    };
    let total = u64::from(num_rows) * u64::from(per_row);
    if total > MAX_CANDIDATES {
        return Err(LayoutError::spacing(format!(
            "{num_rows} rows of {per_row} points exceed {MAX_CANDIDATES} candidates"
        )));
    }
    let mut points = Vec::with_capacity(total as usize);
    for r in 0..num_rows {
        let start = frame.destination(
            axes.origin,
            axes.advance_bearing,
            f64::from(r) * params.row_spacing,
        );
        for i in 0..per_row {
            let pos = if i == 0 {
                start
            } else {
                frame.destination(start, axes.row_bearing, f64::from(i) * step)
            };
            points.push(PlantPoint::new(pos, r + 1, i + 1));
        }
    }
    Ok(PointCollection::new(points))
}

/// Plant points along a drawn row line, `spacing` apart by arc length.
///
/// Emits `floor(length / spacing) + 1` points starting at the first vertex,
/// numbered `plant_id = 1, 2, …` within `row_id`.
pub fn points_along_polyline<F: Frame + ?Sized>(
    line: &[Vector2<f64>],
    spacing: f64,
    row_id: u32,
    frame: &F,
) -> Result<Vec<PlantPoint>> {
    check_spacing("plant_spacing", spacing)?;
    if line.len() < 2 {
        return Err(LayoutError::degenerate(format!(
            "row line needs 2 vertices, got {}",
            line.len()
        )));
    }
    let seg_len: Vec<f64> = line.windows(2).map(|w| frame.distance(w[0], w[1])).collect();
    let total: f64 = seg_len.iter().sum();
    let n = step_count(total, spacing)? + 1;
    let mut out = Vec::with_capacity(n as usize);
    let mut seg = 0usize;
    let mut seg_start = 0.0;
    for i in 0..n {
        let d = (f64::from(i) * spacing).min(total);
        while seg + 1 < seg_len.len() && d > seg_start + seg_len[seg] {
            seg_start += seg_len[seg];
            seg += 1;
        }
        let (a, b) = (line[seg], line[seg + 1]);
        let along = d - seg_start;
        let pos = if along <= 0.0 || seg_len[seg] == 0.0 {
            a
        } else {
            frame.destination(a, frame.bearing(a, b), along)
        };
        out.push(PlantPoint::new(pos, row_id, i + 1));
    }
    Ok(out)
}
