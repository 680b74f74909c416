//! The capability interface the checking layer consumes.

use std::collections::HashSet;

use afem_geom::{CurveId, SurfaceId};
use afem_math::Point3;
use afem_topo::{Compound, Edge, Face, Shape, ShapeType, Shell, Solid, Vertex, Wire};

use crate::analysis::Analysis;
use crate::classify::SolidClassification;
use crate::error::Result;

/// What a B-rep geometry kernel must provide to the shape-checking layer.
///
/// Shapes are exchanged as non-owning handles; the kernel keeps ownership
/// of all topology and geometry. Builders take `&mut self` because they
/// store new shapes; everything else is a read.
pub trait GeometryKernel {
    // =========================================================================
    // Queries
    // =========================================================================

    /// Kind of the stored shape, or `None` for null or foreign handles.
    fn shape_type(&self, shape: &Shape) -> Option<ShapeType>;

    /// Immediate sub-shapes, oriented as seen through `shape`.
    fn children(&self, shape: &Shape) -> Vec<Shape>;

    /// Whether the kernel stores this curve.
    fn has_curve(&self, curve: CurveId) -> bool;

    /// Whether the kernel stores this surface.
    fn has_surface(&self, surface: SurfaceId) -> bool;

    /// Location of a vertex.
    fn vertex_point(&self, vertex: &Vertex) -> Option<Point3>;

    /// Tolerance of a vertex, edge or face; `None` for containers.
    fn tolerance(&self, shape: &Shape) -> Option<f64>;

    /// Distinct sub-shapes of one kind, `shape` itself included, in
    /// first-visit depth-first order.
    fn explore(&self, shape: &Shape, kind: ShapeType) -> Vec<Shape> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![*shape];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.id()) {
                continue;
            }
            match self.shape_type(&current) {
                Some(t) if t == kind => found.push(current),
                Some(t) if t > kind => {
                    stack.extend(self.children(&current).into_iter().rev());
                }
                _ => {}
            }
        }
        found
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// A new vertex at `point`.
    fn make_vertex(&mut self, point: Point3) -> Vertex;

    /// A new edge over the curve's full parametric domain.
    fn make_edge(&mut self, curve: CurveId) -> Result<Edge>;

    /// A new wire through `edges`, in order.
    fn make_wire(&mut self, edges: &[Edge]) -> Result<Wire>;

    /// A new face over the surface's natural bounds.
    fn make_face(&mut self, surface: SurfaceId, tolerance: f64) -> Result<Face>;

    /// A new shell holding `faces`.
    fn make_shell(&mut self, faces: &[Face]) -> Result<Shell>;

    /// A new compound holding `members`.
    fn make_compound(&mut self, members: &[Shape]) -> Result<Compound>;

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Run the validity analyzer over `shape` and all of its sub-shapes.
    /// Topological checks always run; geometric checks only with
    /// `check_geometry`.
    fn analyze(&self, shape: &Shape, check_geometry: bool) -> Analysis;

    /// Whether `edge` is a seam of `face`: used by it both Forward and Reversed.
    fn is_seam(&self, edge: &Edge, face: &Face) -> bool;

    /// The edge's stored SameParameter flag.
    fn same_parameter(&self, edge: &Edge) -> bool;

    /// The edge's stored SameRange flag.
    fn same_range(&self, edge: &Edge) -> bool;

    /// Position of `point` relative to `solid`, within `tolerance`.
    fn classify(&self, solid: &Solid, point: &Point3, tolerance: f64) -> SolidClassification;
}
