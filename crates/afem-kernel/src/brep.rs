//! The in-process B-rep kernel.

use afem_geom::{Curve3d, CurveId, GeometryStore, Surface, SurfaceId};
use afem_math::{Point3, Tolerance};
use afem_topo::{
    Compound, CompSolid, Edge, EdgeData, Face, FaceData, Orientation, Shape, ShapeData,
    ShapeType, Shell, Solid, Topology, TypedShape, Vertex, VertexData, Wire,
};
use tracing::debug;

use crate::analysis::Analysis;
use crate::check;
use crate::classify::{self, SolidClassification};
use crate::error::{KernelError, Result};
use crate::kernel::GeometryKernel;

/// A B-rep kernel holding topology and geometry in memory.
///
/// Shapes are stored once in the [`Topology`] arena and referenced by
/// handles; curves and surfaces live in the [`GeometryStore`].
#[derive(Debug, Clone, Default)]
pub struct BRepKernel {
    /// The shape arena.
    pub topology: Topology,
    /// Curves and surfaces referenced by edges and faces.
    pub geometry: GeometryStore,
}

impl BRepKernel {
    /// Create an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Store a curve.
    pub fn add_curve(&mut self, curve: Box<dyn Curve3d>) -> CurveId {
        self.geometry.add_curve_3d(curve)
    }

    /// Store a surface.
    pub fn add_surface(&mut self, surface: Box<dyn Surface>) -> SurfaceId {
        self.geometry.add_surface(surface)
    }

    /// Look up a stored curve.
    pub fn curve(&self, id: CurveId) -> Option<&dyn Curve3d> {
        self.geometry.curve(id)
    }

    /// Look up a stored surface.
    pub fn surface(&self, id: SurfaceId) -> Option<&dyn Surface> {
        self.geometry.surface(id)
    }

    // =========================================================================
    // Builders beyond the capability interface
    // =========================================================================

    /// A new edge over `[first, last]` of `curve`, with fresh end vertices.
    ///
    /// A closed span gets a single vertex used as both start and end.
    pub fn make_edge_on_range(&mut self, curve: CurveId, first: f64, last: f64) -> Result<Edge> {
        let (p0, p1) = self.curve_span(curve, first, last)?;
        let start = self.make_vertex(p0);
        let end = if Tolerance::DEFAULT.points_equal(&p0, &p1) {
            start
        } else {
            self.make_vertex(p1)
        };
        self.make_edge_between(curve, first, last, start, end)
    }

    /// A new edge over `[first, last]` of `curve`, bounded by existing vertices.
    ///
    /// Used to build shapes whose edges share vertices.
    pub fn make_edge_between(
        &mut self,
        curve: CurveId,
        first: f64,
        last: f64,
        start: Vertex,
        end: Vertex,
    ) -> Result<Edge> {
        self.curve_span(curve, first, last)?;
        for v in [start, end] {
            self.expect_kind(v.as_shape(), ShapeType::Vertex)?;
        }
        let edge = self.topology.add(ShapeData::Edge(EdgeData {
            curve,
            first,
            last,
            tolerance: Tolerance::DEFAULT.linear,
            same_parameter: true,
            same_range: true,
        }));
        self.topology
            .add_child(&edge, Shape::from(start).oriented(Orientation::Forward))?;
        self.topology
            .add_child(&edge, Shape::from(end).oriented(Orientation::Reversed))?;
        debug!(?curve, first, last, "built edge");
        Ok(Edge::from_shape_unchecked(edge))
    }

    /// A new face on `surface` bounded by `wires` (outer boundary first).
    pub fn make_face_with_wires(&mut self, surface: SurfaceId, wires: &[Wire]) -> Result<Face> {
        if wires.is_empty() {
            return Err(KernelError::EmptyInput(ShapeType::Face));
        }
        let face = self.make_face(surface, Tolerance::DEFAULT.linear)?;
        for wire in wires {
            self.expect_kind(wire.as_shape(), ShapeType::Wire)?;
            self.topology.add_child(face.as_shape(), (*wire).into())?;
        }
        Ok(face)
    }

    /// A new solid bounded by `shells` (outer shell first).
    pub fn make_solid(&mut self, shells: &[Shell]) -> Result<Solid> {
        let members: Vec<Shape> = shells.iter().map(|s| (*s).into()).collect();
        self.make_container(ShapeType::Solid, ShapeType::Shell, &members)
            .map(Solid::from_shape_unchecked)
    }

    /// A new compsolid made of `solids`.
    pub fn make_compsolid(&mut self, solids: &[Solid]) -> Result<CompSolid> {
        let members: Vec<Shape> = solids.iter().map(|s| (*s).into()).collect();
        self.make_container(ShapeType::CompSolid, ShapeType::Solid, &members)
            .map(CompSolid::from_shape_unchecked)
    }

    /// Append `child` to `parent` without any kind check.
    ///
    /// This is the raw builder operation; the analyzer reports the illegal
    /// nestings it can produce.
    pub fn add_child(&mut self, parent: &Shape, child: Shape) -> Result<()> {
        Ok(self.topology.add_child(parent, child)?)
    }

    /// Overwrite the tolerance of a vertex, edge or face.
    pub fn set_tolerance(&mut self, shape: &Shape, tolerance: f64) -> Result<()> {
        let node = self
            .topology
            .node_mut(shape)
            .ok_or(KernelError::UnknownShape)?;
        match &mut node.data {
            ShapeData::Vertex(v) => v.tolerance = tolerance,
            ShapeData::Edge(e) => e.tolerance = tolerance,
            ShapeData::Face(f) => f.tolerance = tolerance,
            other => {
                return Err(KernelError::WrongShapeType {
                    expected: ShapeType::Edge,
                    actual: other.shape_type(),
                })
            }
        }
        Ok(())
    }

    /// Overwrite an edge's SameParameter flag.
    pub fn set_same_parameter(&mut self, edge: &Edge, flag: bool) -> Result<()> {
        self.edge_data_mut(edge)?.same_parameter = flag;
        Ok(())
    }

    /// Overwrite an edge's SameRange flag.
    pub fn set_same_range(&mut self, edge: &Edge, flag: bool) -> Result<()> {
        self.edge_data_mut(edge)?.same_range = flag;
        Ok(())
    }

    // =========================================================================
    // Read helpers
    // =========================================================================

    /// Vertex payload behind a handle of any kind.
    pub fn vertex_data(&self, shape: &Shape) -> Option<&VertexData> {
        match &self.topology.node(shape)?.data {
            ShapeData::Vertex(v) => Some(v),
            _ => None,
        }
    }

    /// Edge payload behind a handle of any kind.
    pub fn edge_data(&self, shape: &Shape) -> Option<&EdgeData> {
        match &self.topology.node(shape)?.data {
            ShapeData::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Face payload behind a handle of any kind.
    pub fn face_data(&self, shape: &Shape) -> Option<&FaceData> {
        match &self.topology.node(shape)?.data {
            ShapeData::Face(f) => Some(f),
            _ => None,
        }
    }

    /// Start and end vertex of an edge in traversal order: a Reversed
    /// edge handle runs from its stored end to its stored start.
    pub fn edge_ends(&self, edge: &Shape) -> Option<(Shape, Shape)> {
        let node = self.topology.node(edge)?;
        let start = node
            .children
            .iter()
            .find(|c| c.orientation() == Orientation::Forward)?;
        let end = node
            .children
            .iter()
            .find(|c| c.orientation() == Orientation::Reversed)?;
        match edge.orientation() {
            Orientation::Forward => Some((*start, *end)),
            Orientation::Reversed => Some((*end, *start)),
        }
    }

    /// Whether two vertices are the same node or coincide within the sum
    /// of their tolerances.
    pub fn vertices_meet(&self, a: &Shape, b: &Shape) -> bool {
        if a.is_same(b) {
            return true;
        }
        match (self.vertex_data(a), self.vertex_data(b)) {
            (Some(va), Some(vb)) => {
                let gap = (va.point - vb.point).norm();
                gap <= va.tolerance + vb.tolerance + Tolerance::DEFAULT.linear
            }
            _ => false,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn curve_span(&self, curve: CurveId, first: f64, last: f64) -> Result<(Point3, Point3)> {
        let c = self.curve(curve).ok_or(KernelError::UnknownCurve(curve))?;
        if !first.is_finite() || !last.is_finite() || first >= last {
            return Err(KernelError::InvalidRange { first, last });
        }
        Ok((c.evaluate(first), c.evaluate(last)))
    }

    fn expect_kind(&self, shape: &Shape, expected: ShapeType) -> Result<()> {
        match self.topology.shape_type(shape) {
            None => Err(KernelError::UnknownShape),
            Some(actual) if actual != expected => {
                Err(KernelError::WrongShapeType { expected, actual })
            }
            Some(_) => Ok(()),
        }
    }

    fn edge_data_mut(&mut self, edge: &Edge) -> Result<&mut EdgeData> {
        match self.topology.node_mut(edge.as_shape()).map(|n| &mut n.data) {
            Some(ShapeData::Edge(e)) => Ok(e),
            Some(other) => Err(KernelError::WrongShapeType {
                expected: ShapeType::Edge,
                actual: other.shape_type(),
            }),
            None => Err(KernelError::UnknownShape),
        }
    }

    /// Build a container of `kind` whose members must all be `member_kind`
    /// (any kind for a compound).
    fn make_container(
        &mut self,
        kind: ShapeType,
        member_kind: ShapeType,
        members: &[Shape],
    ) -> Result<Shape> {
        for member in members {
            let actual = self
                .topology
                .shape_type(member)
                .ok_or(KernelError::UnknownShape)?;
            if kind != ShapeType::Compound && actual != member_kind {
                return Err(KernelError::WrongShapeType {
                    expected: member_kind,
                    actual,
                });
            }
        }
        let data = ShapeData::container(kind).ok_or(KernelError::EmptyInput(kind))?;
        let container = self.topology.add(data);
        for member in members {
            self.topology.add_child(&container, *member)?;
        }
        debug!(%kind, members = members.len(), "built container");
        Ok(container)
    }
}

impl GeometryKernel for BRepKernel {
    fn shape_type(&self, shape: &Shape) -> Option<ShapeType> {
        self.topology.shape_type(shape)
    }

    fn children(&self, shape: &Shape) -> Vec<Shape> {
        self.topology.children(shape)
    }

    fn has_curve(&self, curve: CurveId) -> bool {
        self.curve(curve).is_some()
    }

    fn has_surface(&self, surface: SurfaceId) -> bool {
        self.surface(surface).is_some()
    }

    fn vertex_point(&self, vertex: &Vertex) -> Option<Point3> {
        self.vertex_data(vertex.as_shape()).map(|v| v.point)
    }

    fn tolerance(&self, shape: &Shape) -> Option<f64> {
        self.topology.node(shape)?.data.tolerance()
    }

    fn make_vertex(&mut self, point: Point3) -> Vertex {
        let shape = self.topology.add(ShapeData::Vertex(VertexData {
            point,
            tolerance: Tolerance::DEFAULT.linear,
        }));
        Vertex::from_shape_unchecked(shape)
    }

    fn make_edge(&mut self, curve: CurveId) -> Result<Edge> {
        let (first, last) = self
            .curve(curve)
            .ok_or(KernelError::UnknownCurve(curve))?
            .domain();
        self.make_edge_on_range(curve, first, last)
    }

    fn make_wire(&mut self, edges: &[Edge]) -> Result<Wire> {
        if edges.is_empty() {
            return Err(KernelError::EmptyInput(ShapeType::Wire));
        }
        for edge in edges {
            self.expect_kind(edge.as_shape(), ShapeType::Edge)?;
        }
        for (index, pair) in edges.windows(2).enumerate() {
            let (_, end) = self
                .edge_ends(pair[0].as_shape())
                .ok_or(KernelError::UnknownShape)?;
            let (start, _) = self
                .edge_ends(pair[1].as_shape())
                .ok_or(KernelError::UnknownShape)?;
            if !self.vertices_meet(&end, &start) {
                return Err(KernelError::DisconnectedWire { index });
            }
        }
        let members: Vec<Shape> = edges.iter().map(|e| (*e).into()).collect();
        self.make_container(ShapeType::Wire, ShapeType::Edge, &members)
            .map(Wire::from_shape_unchecked)
    }

    fn make_face(&mut self, surface: SurfaceId, tolerance: f64) -> Result<Face> {
        if !self.has_surface(surface) {
            return Err(KernelError::UnknownSurface(surface));
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(KernelError::InvalidTolerance(tolerance));
        }
        let face = self
            .topology
            .add(ShapeData::Face(FaceData { surface, tolerance }));
        debug!(?surface, tolerance, "built face");
        Ok(Face::from_shape_unchecked(face))
    }

    fn make_shell(&mut self, faces: &[Face]) -> Result<Shell> {
        let members: Vec<Shape> = faces.iter().map(|f| (*f).into()).collect();
        self.make_container(ShapeType::Shell, ShapeType::Face, &members)
            .map(Shell::from_shape_unchecked)
    }

    fn make_compound(&mut self, members: &[Shape]) -> Result<Compound> {
        self.make_container(ShapeType::Compound, ShapeType::Compound, members)
            .map(Compound::from_shape_unchecked)
    }

    fn analyze(&self, shape: &Shape, check_geometry: bool) -> Analysis {
        check::analyze(self, shape, check_geometry)
    }

    fn is_seam(&self, edge: &Edge, face: &Face) -> bool {
        let mut forward = false;
        let mut reversed = false;
        for wire in self.topology.children(face.as_shape()) {
            for used in self.topology.children(&wire) {
                if used.is_same(edge.as_shape()) {
                    match used.orientation() {
                        Orientation::Forward => forward = true,
                        Orientation::Reversed => reversed = true,
                    }
                }
            }
        }
        forward && reversed
    }

    fn same_parameter(&self, edge: &Edge) -> bool {
        self.edge_data(edge.as_shape())
            .is_some_and(|e| e.same_parameter)
    }

    fn same_range(&self, edge: &Edge) -> bool {
        self.edge_data(edge.as_shape()).is_some_and(|e| e.same_range)
    }

    fn classify(&self, solid: &Solid, point: &Point3, tolerance: f64) -> SolidClassification {
        classify::classify_point(self, solid, point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afem_geom::{Circle3d, CylinderSurface, Line3d, Plane};

    fn line(kernel: &mut BRepKernel, a: [f64; 3], b: [f64; 3]) -> CurveId {
        kernel.add_curve(Box::new(Line3d::from_points(
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
        )))
    }

    #[test]
    fn test_make_edge_full_domain() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel, [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let edge = kernel.make_edge(c).unwrap();
        let data = kernel.edge_data(edge.as_shape()).unwrap();
        assert_eq!((data.first, data.last), (0.0, 1.0));
        let (start, end) = kernel.edge_ends(edge.as_shape()).unwrap();
        assert!(!start.is_same(&end));
        let p_end = kernel.vertex_data(&end).unwrap().point;
        assert!((p_end.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_closed_curve_edge_shares_vertex() {
        let mut kernel = BRepKernel::new();
        let c = kernel.add_curve(Box::new(Circle3d::new(Point3::origin(), 1.0)));
        let edge = kernel.make_edge(c).unwrap();
        let (start, end) = kernel.edge_ends(edge.as_shape()).unwrap();
        assert!(start.is_same(&end));
        assert_eq!(kernel.children(edge.as_shape()).len(), 2);
    }

    #[test]
    fn test_reversed_edge_swaps_ends() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let edge = kernel.make_edge(c).unwrap();
        let (s, e) = kernel.edge_ends(edge.as_shape()).unwrap();
        let (rs, re) = kernel.edge_ends(edge.reversed().as_shape()).unwrap();
        assert!(rs.is_same(&e));
        assert!(re.is_same(&s));
    }

    #[test]
    fn test_make_edge_errors() {
        let mut kernel = BRepKernel::new();
        assert_eq!(
            kernel.make_edge(CurveId(7)),
            Err(KernelError::UnknownCurve(CurveId(7)))
        );
        let c = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(matches!(
            kernel.make_edge_on_range(c, 1.0, 0.5),
            Err(KernelError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_make_wire_connectivity() {
        let mut kernel = BRepKernel::new();
        let a = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = line(&mut kernel, [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        let far = line(&mut kernel, [5.0, 5.0, 0.0], [6.0, 5.0, 0.0]);
        let ea = kernel.make_edge(a).unwrap();
        let eb = kernel.make_edge(b).unwrap();
        let ef = kernel.make_edge(far).unwrap();

        let wire = kernel.make_wire(&[ea, eb]).unwrap();
        assert_eq!(kernel.children(wire.as_shape()).len(), 2);
        assert_eq!(
            kernel.make_wire(&[ea, ef]),
            Err(KernelError::DisconnectedWire { index: 0 })
        );
        assert_eq!(
            kernel.make_wire(&[]),
            Err(KernelError::EmptyInput(ShapeType::Wire))
        );
    }

    #[test]
    fn test_make_shell_rejects_wrong_member() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let edge = kernel.make_edge(c).unwrap();
        let s = kernel.add_surface(Box::new(Plane::xy()));
        let face = kernel.make_face(s, 0.0).unwrap();
        let shell = kernel.make_shell(&[face]).unwrap();
        assert_eq!(kernel.shape_type(shell.as_shape()), Some(ShapeType::Shell));

        let err = kernel
            .make_compound(&[edge.into(), Shape::null()])
            .unwrap_err();
        assert_eq!(err, KernelError::UnknownShape);
        assert!(matches!(
            kernel.make_solid(&[Shell::from_shape_unchecked(face.into())]),
            Err(KernelError::WrongShapeType {
                expected: ShapeType::Shell,
                actual: ShapeType::Face
            })
        ));
    }

    #[test]
    fn test_make_face_errors() {
        let mut kernel = BRepKernel::new();
        assert_eq!(
            kernel.make_face(SurfaceId(0), 0.0),
            Err(KernelError::UnknownSurface(SurfaceId(0)))
        );
        let s = kernel.add_surface(Box::new(Plane::xy()));
        assert_eq!(
            kernel.make_face(s, -1.0),
            Err(KernelError::InvalidTolerance(-1.0))
        );
    }

    #[test]
    fn test_seam_on_cylinder_face() {
        let mut kernel = BRepKernel::new();
        let bottom = kernel.add_curve(Box::new(Circle3d::new(Point3::origin(), 1.0)));
        let top = kernel.add_curve(Box::new(Circle3d::new(Point3::new(0.0, 0.0, 2.0), 1.0)));
        let seam_curve = line(&mut kernel, [1.0, 0.0, 0.0], [1.0, 0.0, 2.0]);

        let e_bottom = kernel.make_edge(bottom).unwrap();
        let e_top = kernel.make_edge(top).unwrap();
        let (v_bottom, _) = kernel.edge_ends(e_bottom.as_shape()).unwrap();
        let (v_top, _) = kernel.edge_ends(e_top.as_shape()).unwrap();
        let e_seam = kernel
            .make_edge_between(
                seam_curve,
                0.0,
                1.0,
                Vertex::from_shape_unchecked(v_bottom),
                Vertex::from_shape_unchecked(v_top),
            )
            .unwrap();

        let wire = kernel
            .make_wire(&[e_bottom, e_seam, e_top.reversed(), e_seam.reversed()])
            .unwrap();
        let cyl = kernel.add_surface(Box::new(CylinderSurface::new(1.0)));
        let face = kernel.make_face_with_wires(cyl, &[wire]).unwrap();

        assert!(kernel.is_seam(&e_seam, &face));
        assert!(!kernel.is_seam(&e_bottom, &face));
        assert!(kernel.analyze(face.as_shape(), true).is_valid());
    }

    #[test]
    fn test_edge_metadata_passthrough() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let edge = kernel.make_edge(c).unwrap();
        assert!(kernel.same_parameter(&edge));
        assert!(kernel.same_range(&edge));
        kernel.set_same_range(&edge, false).unwrap();
        assert!(!kernel.same_range(&edge));
        assert!(kernel.same_parameter(&edge));
    }

    #[test]
    fn test_explore_unique_vertices() {
        let mut kernel = BRepKernel::new();
        let a = line(&mut kernel, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let ea = kernel.make_edge(a).unwrap();
        let (_, end) = kernel.edge_ends(ea.as_shape()).unwrap();
        let b = line(&mut kernel, [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        let v_far = kernel.make_vertex(Point3::new(1.0, 1.0, 0.0));
        let eb = kernel
            .make_edge_between(b, 0.0, 1.0, Vertex::from_shape_unchecked(end), v_far)
            .unwrap();
        let wire = kernel.make_wire(&[ea, eb]).unwrap();

        let vertices = kernel.explore(wire.as_shape(), ShapeType::Vertex);
        assert_eq!(vertices.len(), 3);
        let edges = kernel.explore(wire.as_shape(), ShapeType::Edge);
        assert_eq!(edges.len(), 2);
        assert_eq!(kernel.explore(wire.as_shape(), ShapeType::Wire).len(), 1);
    }
}
