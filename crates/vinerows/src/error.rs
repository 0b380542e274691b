//! Error type shared by the layout pipeline.
//!
//! All variants are deterministic input-validation failures: nothing is
//! retried, and a stage that fails produces no partial output.

use std::fmt;

/// Errors surfaced by hull, rectangle, grid and renumbering stages.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// Fewer than 3 distinct vertices, or a hull/rectangle with zero area.
    DegenerateGeometry { reason: String },
    /// Zero, negative or non-finite spacing / point-count parameters.
    InvalidSpacing { reason: String },
    /// A point lacks the grouping metadata renumbering needs.
    MissingGroupKey { index: usize, key: &'static str },
}

impl LayoutError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn spacing(reason: impl Into<String>) -> Self {
        Self::InvalidSpacing {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry { reason } => write!(f, "degenerate geometry: {reason}"),
            Self::InvalidSpacing { reason } => write!(f, "invalid spacing: {reason}"),
            Self::MissingGroupKey { index, key } => {
                write!(f, "point {index} has no `{key}` to group by")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;
