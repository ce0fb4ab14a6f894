//! Error type shared by the kernel operations.
//!
//! Outcomes that are *not* errors (a redundant plane, a solid that collapsed
//! to nothing during `add_faces`) are reported through result enums instead;
//! see `polytope::Intersection` and `polytope::MoveOutcome`.

use nalgebra::Vector3;
use thiserror::Error;

/// Result alias for kernel operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Edge endpoint marks form a combination the intersection pass does not define.
    #[error("invalid mark state: edge endpoints marked {start} and {end}")]
    InvalidMarkState {
        start: &'static str,
        end: &'static str,
    },

    /// Split requested for an edge that does not cross the plane.
    #[error("edge is not splittable by the given plane")]
    NotSplittable,

    /// Numerical degeneracy beyond tolerance; the polytope was left untouched.
    #[error("brush is invalid: {reason}")]
    BrushIsInvalid { reason: String },

    /// Returned by builders that must produce a solid.
    #[error("brush is empty")]
    BrushIsEmpty,

    #[error("vertex ({}, {}, {}) leaves the world bounds", .position.x, .position.y, .position.z)]
    OutOfWorldBounds { position: Vector3<f64> },

    #[error("no vertex at ({}, {}, {})", .position.x, .position.y, .position.z)]
    UnknownVertex { position: Vector3<f64> },

    #[error("no edge between ({}, {}, {}) and ({}, {}, {})", .start.x, .start.y, .start.z, .end.x, .end.y, .end.z)]
    UnknownEdge {
        start: Vector3<f64>,
        end: Vector3<f64>,
    },

    #[error("no face with the given {count} vertices")]
    UnknownFace { count: usize },

    /// The requested manipulation would corrupt the brush.
    #[error("move rejected: {reason}")]
    MoveRejected { reason: String },
}

impl GeometryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::BrushIsInvalid {
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(reason: impl Into<String>) -> Self {
        Self::MoveRejected {
            reason: reason.into(),
        }
    }

    /// Collapse primitive-level failures into `BrushIsInvalid`; other variants pass through.
    pub(crate) fn into_invalid(self) -> Self {
        match self {
            Self::InvalidMarkState { .. } | Self::NotSplittable => Self::invalid(self.to_string()),
            other => other,
        }
    }
}
