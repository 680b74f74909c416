//! Shape validity checking.

use afem_kernel::{Analysis, GeometryKernel};
use afem_topo::{Edge, Face, Shape, ShapeId, ShapeType};
use tracing::{debug, warn};

use crate::config::CheckConfig;
use crate::error::InvalidShapeError;

/// Runs the kernel's analyzer once over a shape and answers validity
/// questions from the cached result.
///
/// A geometrically broken shape is not an error: it yields
/// `is_valid() == false` and a non-empty [`invalid_shapes`](Self::invalid_shapes).
#[derive(Debug, Clone)]
pub struct ShapeValidator {
    shape: Shape,
    analysis: Analysis,
    invalid: Vec<Shape>,
}

impl ShapeValidator {
    /// Analyze `shape`, with geometric checks if `check_geometry`.
    ///
    /// With `dump`, one warning is logged per defect found.
    pub fn new<K: GeometryKernel + ?Sized>(
        kernel: &K,
        shape: impl Into<Shape>,
        check_geometry: bool,
        dump: bool,
    ) -> Result<Self, InvalidShapeError> {
        let shape = shape.into();
        let Some(kind) = kernel.shape_type(&shape) else {
            return Err(InvalidShapeError {
                operation: "shape validation",
            });
        };

        let analysis = kernel.analyze(&shape, check_geometry);
        let invalid = if analysis.is_valid() {
            Vec::new()
        } else {
            collect_invalid(kernel, &analysis, &shape, &mut Vec::new())
        };
        debug!(%kind, valid = analysis.is_valid(), defects = invalid.len(), "validated shape");

        let validator = Self {
            shape,
            analysis,
            invalid,
        };
        if dump {
            for line in validator.dump_report(kernel) {
                warn!("{line}");
            }
        }
        Ok(validator)
    }

    /// Analyze `shape` with the options in `config`.
    pub fn with_config<K: GeometryKernel + ?Sized>(
        kernel: &K,
        shape: impl Into<Shape>,
        config: &CheckConfig,
    ) -> Result<Self, InvalidShapeError> {
        Self::new(kernel, shape, config.check_geometry, config.dump)
    }

    /// The analyzed shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether the analyzer found no defect anywhere in the shape.
    pub fn is_valid(&self) -> bool {
        self.analysis.is_valid()
    }

    /// Every defective sub-shape occurrence, parents before their children.
    pub fn invalid_shapes(&self) -> &[Shape] {
        &self.invalid
    }

    /// Whether one sub-shape passed every check. Shapes that are not part
    /// of the analyzed tree are reported invalid.
    pub fn is_subshape_valid(&self, shape: &Shape) -> bool {
        self.analysis.is_shape_valid(shape).unwrap_or(false)
    }

    /// The full analyzer result.
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// One line per defect, e.g. `"INVALID_RANGE on edge"`.
    pub fn dump_report<K: GeometryKernel + ?Sized>(&self, kernel: &K) -> Vec<String> {
        let mut lines = Vec::new();
        for shape in &self.invalid {
            let kind = kernel
                .shape_type(shape)
                .map_or("<unknown>", ShapeType::name);
            for status in self.analysis.status(shape).unwrap_or_default() {
                lines.push(format!("{status} on {kind}"));
            }
        }
        lines
    }

    /// Whether `edge` is a seam of `face`.
    pub fn is_seam<K: GeometryKernel + ?Sized>(kernel: &K, edge: &Edge, face: &Face) -> bool {
        kernel.is_seam(edge, face)
    }

    /// The edge's SameParameter flag.
    pub fn same_parameter<K: GeometryKernel + ?Sized>(kernel: &K, edge: &Edge) -> bool {
        kernel.same_parameter(edge)
    }

    /// The edge's SameRange flag.
    pub fn same_range<K: GeometryKernel + ?Sized>(kernel: &K, edge: &Edge) -> bool {
        kernel.same_range(edge)
    }
}

/// Pre-order list of defective occurrences under `shape`, itself included.
///
/// `ancestors` holds the ids on the current path; a child already on it
/// is skipped so a cyclic nesting cannot recurse forever.
fn collect_invalid<K: GeometryKernel + ?Sized>(
    kernel: &K,
    analysis: &Analysis,
    shape: &Shape,
    ancestors: &mut Vec<ShapeId>,
) -> Vec<Shape> {
    let mut found = Vec::new();
    if analysis.is_shape_valid(shape) == Some(false) {
        found.push(*shape);
    }
    ancestors.push(shape.id());
    for child in kernel.children(shape) {
        if !ancestors.contains(&child.id()) {
            found.extend(collect_invalid(kernel, analysis, &child, ancestors));
        }
    }
    ancestors.pop();
    found
}
