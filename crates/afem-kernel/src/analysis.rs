//! Results of the shape validity analyzer.

use std::collections::HashMap;
use std::fmt;

use afem_topo::{Shape, ShapeId};

/// Outcome of one validity check on one sub-shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    /// The sub-shape passed every check.
    NoError,
    /// The handle is null or not stored in the kernel.
    NullShape,
    /// A child's kind may not be nested in this shape's kind.
    InvalidSubShapeType,
    /// A vertex point has a non-finite coordinate.
    InvalidPoint,
    /// A tolerance is negative or not finite.
    InvalidToleranceValue,
    /// An edge refers to a curve the kernel does not store.
    No3DCurve,
    /// An edge parameter range is empty, reversed, not finite or outside the curve domain.
    InvalidRange,
    /// An edge does not have exactly one start and one end vertex.
    InvalidVertexCount,
    /// An edge vertex lies off the curve end by more than the tolerances allow.
    InvalidPointOnCurve,
    /// The edge's SameParameter flag is cleared.
    InvalidSameParameterFlag,
    /// The edge's SameRange flag is cleared.
    InvalidSameRangeFlag,
    /// A wire has no edges.
    EmptyWire,
    /// Consecutive edges of a wire do not meet.
    NotConnected,
    /// A face boundary wire does not close.
    NotClosed,
    /// A face refers to a surface the kernel does not store.
    NoSurface,
    /// A face boundary vertex lies off the surface.
    InvalidPointOnSurface,
    /// A shell has no faces.
    EmptyShell,
    /// A solid has no shells.
    EmptySolid,
}

impl CheckStatus {
    /// Stable upper-case name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            CheckStatus::NoError => "NO_ERROR",
            CheckStatus::NullShape => "NULL_SHAPE",
            CheckStatus::InvalidSubShapeType => "INVALID_SUB_SHAPE_TYPE",
            CheckStatus::InvalidPoint => "INVALID_POINT",
            CheckStatus::InvalidToleranceValue => "INVALID_TOLERANCE_VALUE",
            CheckStatus::No3DCurve => "NO_3D_CURVE",
            CheckStatus::InvalidRange => "INVALID_RANGE",
            CheckStatus::InvalidVertexCount => "INVALID_VERTEX_COUNT",
            CheckStatus::InvalidPointOnCurve => "INVALID_POINT_ON_CURVE",
            CheckStatus::InvalidSameParameterFlag => "INVALID_SAME_PARAMETER_FLAG",
            CheckStatus::InvalidSameRangeFlag => "INVALID_SAME_RANGE_FLAG",
            CheckStatus::EmptyWire => "EMPTY_WIRE",
            CheckStatus::NotConnected => "NOT_CONNECTED",
            CheckStatus::NotClosed => "NOT_CLOSED",
            CheckStatus::NoSurface => "NO_SURFACE",
            CheckStatus::InvalidPointOnSurface => "INVALID_POINT_ON_SURFACE",
            CheckStatus::EmptyShell => "EMPTY_SHELL",
            CheckStatus::EmptySolid => "EMPTY_SOLID",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-sub-shape status lists produced by one analyzer run.
///
/// Every node reachable from the analyzed shape has exactly one entry.
/// A node that passed every check has the list `[NoError]`; a defective
/// node lists its defects and never `NoError`.
#[derive(Debug, Clone)]
pub struct Analysis {
    root: Shape,
    statuses: HashMap<ShapeId, Vec<CheckStatus>>,
}

impl Analysis {
    pub(crate) fn new(root: Shape, statuses: HashMap<ShapeId, Vec<CheckStatus>>) -> Self {
        Self { root, statuses }
    }

    /// The analyzed shape.
    pub fn root(&self) -> Shape {
        self.root
    }

    /// True iff no sub-shape (the root included) has a defect.
    pub fn is_valid(&self) -> bool {
        self.statuses
            .values()
            .all(|list| list.iter().all(|s| *s == CheckStatus::NoError))
    }

    /// Status list of one sub-shape, or `None` if it is not part of the
    /// analyzed tree. Orientation is ignored.
    pub fn status(&self, shape: &Shape) -> Option<&[CheckStatus]> {
        self.statuses.get(&shape.id()).map(Vec::as_slice)
    }

    /// Whether one sub-shape passed every check; `None` if it is not part
    /// of the analyzed tree.
    pub fn is_shape_valid(&self, shape: &Shape) -> Option<bool> {
        self.status(shape)
            .map(|list| list.iter().all(|s| *s == CheckStatus::NoError))
    }

    /// Number of distinct sub-shapes analyzed.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether nothing was analyzed.
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
