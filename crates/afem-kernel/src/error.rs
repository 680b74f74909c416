//! Error types for kernel construction.

use afem_geom::{CurveId, SurfaceId};
use afem_topo::{ShapeType, TopoError};
use thiserror::Error;

/// Errors raised by kernel builders.
///
/// Geometric defects in an existing shape are never errors; they are
/// reported by [`GeometryKernel::analyze`](crate::GeometryKernel::analyze).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// A handle is null or refers to no shape in this kernel.
    #[error("shape is null or not stored in this kernel")]
    UnknownShape,

    /// A curve handle refers to no curve in this kernel.
    #[error("unknown curve {0:?}")]
    UnknownCurve(CurveId),

    /// A surface handle refers to no surface in this kernel.
    #[error("unknown surface {0:?}")]
    UnknownSurface(SurfaceId),

    /// A member has the wrong kind for the container being built.
    #[error("expected a {expected}, got a {actual}")]
    WrongShapeType {
        /// Kind the builder accepts.
        expected: ShapeType,
        /// Kind that was supplied.
        actual: ShapeType,
    },

    /// Edge parameter range is empty, reversed or not finite.
    #[error("invalid parameter range [{first}, {last}]")]
    InvalidRange {
        /// Start parameter.
        first: f64,
        /// End parameter.
        last: f64,
    },

    /// Tolerance is negative or not finite.
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f64),

    /// A container that needs members was given none.
    #[error("cannot build a {0} from no members")]
    EmptyInput(ShapeType),

    /// Two consecutive edges of a wire do not meet.
    #[error("wire edges {index} and {} are not connected", .index + 1)]
    DisconnectedWire {
        /// Position of the first edge of the failing pair.
        index: usize,
    },
}

impl From<TopoError> for KernelError {
    fn from(err: TopoError) -> Self {
        match err {
            TopoError::UnknownShape => KernelError::UnknownShape,
        }
    }
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
