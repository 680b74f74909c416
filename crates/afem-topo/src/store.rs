//! Slotmap-backed storage for topological shapes.

use afem_geom::{CurveId, SurfaceId};
use afem_math::Point3;
use slotmap::SlotMap;
use thiserror::Error;

use crate::hierarchy::ShapeType;
use crate::shape::Shape;

slotmap::new_key_type! {
    /// Unique identifier for a shape node in the topology store.
    pub struct ShapeId;
}

/// Errors raised by direct topology edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopoError {
    /// The handle is null or refers to no node in this store.
    #[error("shape is not stored in this topology")]
    UnknownShape,
}

/// Geometric data carried by a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    /// Location.
    pub point: Point3,
    /// Allowed deviation of anything meeting at this vertex.
    pub tolerance: f64,
}

/// Geometric data and metadata carried by an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    /// The 3D curve the edge lies on.
    pub curve: CurveId,
    /// Start parameter on the curve.
    pub first: f64,
    /// End parameter on the curve.
    pub last: f64,
    /// Allowed deviation of the edge from its curve.
    pub tolerance: f64,
    /// Curve representations share one parameterization.
    pub same_parameter: bool,
    /// Curve representations share one parameter range.
    pub same_range: bool,
}

/// Geometric data carried by a face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceData {
    /// The surface the face lies on.
    pub surface: SurfaceId,
    /// Allowed deviation of the face from its surface.
    pub tolerance: f64,
}

/// Per-kind payload of a stored shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeData {
    /// A vertex.
    Vertex(VertexData),
    /// An edge.
    Edge(EdgeData),
    /// A wire.
    Wire,
    /// A face.
    Face(FaceData),
    /// A shell.
    Shell,
    /// A solid.
    Solid,
    /// A compsolid.
    CompSolid,
    /// A compound.
    Compound,
}

impl ShapeData {
    /// The kind of shape this payload describes.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeData::Vertex(_) => ShapeType::Vertex,
            ShapeData::Edge(_) => ShapeType::Edge,
            ShapeData::Wire => ShapeType::Wire,
            ShapeData::Face(_) => ShapeType::Face,
            ShapeData::Shell => ShapeType::Shell,
            ShapeData::Solid => ShapeType::Solid,
            ShapeData::CompSolid => ShapeType::CompSolid,
            ShapeData::Compound => ShapeType::Compound,
        }
    }

    /// The payload of an empty container of the given kind, or `None`
    /// for kinds that carry geometry.
    pub fn container(kind: ShapeType) -> Option<Self> {
        match kind {
            ShapeType::Wire => Some(ShapeData::Wire),
            ShapeType::Shell => Some(ShapeData::Shell),
            ShapeType::Solid => Some(ShapeData::Solid),
            ShapeType::CompSolid => Some(ShapeData::CompSolid),
            ShapeType::Compound => Some(ShapeData::Compound),
            ShapeType::Vertex | ShapeType::Edge | ShapeType::Face => None,
        }
    }

    /// Tolerance of a vertex, edge or face.
    pub fn tolerance(&self) -> Option<f64> {
        match self {
            ShapeData::Vertex(v) => Some(v.tolerance),
            ShapeData::Edge(e) => Some(e.tolerance),
            ShapeData::Face(f) => Some(f.tolerance),
            _ => None,
        }
    }
}

/// A stored shape: its payload and its oriented immediate sub-shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    /// Kind-specific data.
    pub data: ShapeData,
    /// Immediate sub-shapes, in insertion order.
    pub children: Vec<Shape>,
}

impl ShapeNode {
    /// The stored kind.
    pub fn shape_type(&self) -> ShapeType {
        self.data.shape_type()
    }
}

/// The shape arena.
///
/// Every vertex, edge, wire, face, shell, solid, compsolid and compound
/// lives here exactly once; containers refer to their members through
/// oriented [`Shape`] handles, so members may be shared.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// All stored shapes.
    pub nodes: SlotMap<ShapeId, ShapeNode>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a childless shape and return a Forward handle to it.
    pub fn add(&mut self, data: ShapeData) -> Shape {
        Shape::new(self.nodes.insert(ShapeNode {
            data,
            children: Vec::new(),
        }))
    }

    /// Append `child` to the sub-shapes of `parent`.
    ///
    /// No kind check is made; the analyzer reports illegal nesting.
    pub fn add_child(&mut self, parent: &Shape, child: Shape) -> Result<(), TopoError> {
        if !self.nodes.contains_key(child.id()) {
            return Err(TopoError::UnknownShape);
        }
        let node = self
            .nodes
            .get_mut(parent.id())
            .ok_or(TopoError::UnknownShape)?;
        node.children.push(child);
        Ok(())
    }

    /// Look up the node behind a handle.
    pub fn node(&self, shape: &Shape) -> Option<&ShapeNode> {
        self.nodes.get(shape.id())
    }

    /// Mutable access to the node behind a handle.
    pub fn node_mut(&mut self, shape: &Shape) -> Option<&mut ShapeNode> {
        self.nodes.get_mut(shape.id())
    }

    /// Whether the handle refers to a stored node.
    pub fn contains(&self, shape: &Shape) -> bool {
        self.nodes.contains_key(shape.id())
    }

    /// Stored kind of the node behind a handle.
    pub fn shape_type(&self, shape: &Shape) -> Option<ShapeType> {
        self.node(shape).map(ShapeNode::shape_type)
    }

    /// Immediate sub-shapes as seen through `shape`: each child's
    /// orientation is composed with the parent handle's orientation.
    pub fn children(&self, shape: &Shape) -> Vec<Shape> {
        self.node(shape)
            .map(|node| {
                node.children
                    .iter()
                    .map(|c| c.oriented(c.orientation().compose(shape.orientation())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of stored shapes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Orientation;

    fn vertex(topo: &mut Topology, x: f64) -> Shape {
        topo.add(ShapeData::Vertex(VertexData {
            point: Point3::new(x, 0.0, 0.0),
            tolerance: 1e-7,
        }))
    }

    #[test]
    fn test_add_and_query() {
        let mut topo = Topology::new();
        let v = vertex(&mut topo, 1.0);
        assert!(topo.contains(&v));
        assert_eq!(topo.shape_type(&v), Some(ShapeType::Vertex));
        assert_eq!(topo.len(), 1);
        assert_eq!(topo.shape_type(&Shape::null()), None);
    }

    #[test]
    fn test_children_compose_orientation() {
        let mut topo = Topology::new();
        let wire = topo.add(ShapeData::Wire);
        let a = vertex(&mut topo, 0.0);
        let b = vertex(&mut topo, 1.0);
        topo.add_child(&wire, a).unwrap();
        topo.add_child(&wire, b.reversed()).unwrap();

        let forward = topo.children(&wire);
        assert_eq!(forward, vec![a, b.reversed()]);

        let through_reversed = topo.children(&wire.reversed());
        assert_eq!(through_reversed[0].orientation(), Orientation::Reversed);
        assert_eq!(through_reversed[1].orientation(), Orientation::Forward);
    }

    #[test]
    fn test_add_child_rejects_unknown() {
        let mut topo = Topology::new();
        let wire = topo.add(ShapeData::Wire);
        assert_eq!(
            topo.add_child(&wire, Shape::null()),
            Err(TopoError::UnknownShape)
        );
        let v = vertex(&mut topo, 0.0);
        assert_eq!(
            topo.add_child(&Shape::null(), v),
            Err(TopoError::UnknownShape)
        );
    }

    #[test]
    fn test_container_payloads() {
        assert_eq!(ShapeData::container(ShapeType::Shell), Some(ShapeData::Shell));
        assert_eq!(ShapeData::container(ShapeType::Face), None);
        for kind in ShapeType::ALL {
            if let Some(data) = ShapeData::container(kind) {
                assert_eq!(data.shape_type(), kind);
            }
        }
    }
}
