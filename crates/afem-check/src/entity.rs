//! Heterogeneous conversion inputs and concrete shape outputs.

use afem_geom::{CurveId, SurfaceId};
use afem_kernel::GeometryKernel;
use afem_math::{point_from_coords, Point3};
use afem_topo::{
    CompSolid, Compound, Edge, Face, Shape, ShapeType, Shell, Solid, TypedShape, Vertex, Wire,
};

use crate::error::EntityKind;

/// Anything the conversion functions accept.
///
/// Shape handles come either generic ([`Entity::Shape`]) or already typed;
/// the remaining variants are geometry that a shape can be built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity {
    /// No value.
    Null,
    /// A shape handle of unknown kind.
    Shape(Shape),
    /// A vertex handle.
    Vertex(Vertex),
    /// An edge handle.
    Edge(Edge),
    /// A wire handle.
    Wire(Wire),
    /// A face handle.
    Face(Face),
    /// A shell handle.
    Shell(Shell),
    /// A solid handle.
    Solid(Solid),
    /// A compsolid handle.
    CompSolid(CompSolid),
    /// A compound handle.
    Compound(Compound),
    /// A location in space.
    Point(Point3),
    /// A stored parametric curve.
    Curve(CurveId),
    /// A stored parametric surface.
    Surface(SurfaceId),
}

impl Entity {
    /// The shape handle inside, generic or typed.
    pub fn shape(&self) -> Option<Shape> {
        match *self {
            Entity::Shape(s) => Some(s),
            Entity::Vertex(s) => Some(s.into()),
            Entity::Edge(s) => Some(s.into()),
            Entity::Wire(s) => Some(s.into()),
            Entity::Face(s) => Some(s.into()),
            Entity::Shell(s) => Some(s.into()),
            Entity::Solid(s) => Some(s.into()),
            Entity::CompSolid(s) => Some(s.into()),
            Entity::Compound(s) => Some(s.into()),
            Entity::Null | Entity::Point(_) | Entity::Curve(_) | Entity::Surface(_) => None,
        }
    }

    /// The kind a typed handle claims to be.
    pub(crate) fn tag(&self) -> Option<ShapeType> {
        match self {
            Entity::Vertex(_) => Some(ShapeType::Vertex),
            Entity::Edge(_) => Some(ShapeType::Edge),
            Entity::Wire(_) => Some(ShapeType::Wire),
            Entity::Face(_) => Some(ShapeType::Face),
            Entity::Shell(_) => Some(ShapeType::Shell),
            Entity::Solid(_) => Some(ShapeType::Solid),
            Entity::CompSolid(_) => Some(ShapeType::CompSolid),
            Entity::Compound(_) => Some(ShapeType::Compound),
            _ => None,
        }
    }

    /// The stored shape and its kind, if this is a live handle whose tag
    /// (if any) agrees with the kernel.
    pub fn resolve<K: GeometryKernel + ?Sized>(&self, kernel: &K) -> Option<(Shape, ShapeType)> {
        let shape = self.shape()?;
        let kind = kernel.shape_type(&shape)?;
        match self.tag() {
            Some(tag) if tag != kind => None,
            _ => Some((shape, kind)),
        }
    }

    /// What this input is, as reported in conversion errors.
    pub fn observed<K: GeometryKernel + ?Sized>(&self, kernel: &K) -> EntityKind {
        match self {
            Entity::Null => EntityKind::Null,
            Entity::Point(_) => EntityKind::Point,
            Entity::Curve(_) => EntityKind::Curve,
            Entity::Surface(_) => EntityKind::Surface,
            _ => match (self.shape(), self.resolve(kernel)) {
                (Some(s), _) if s.is_null() => EntityKind::Null,
                (_, Some((_, kind))) => EntityKind::Shape(kind),
                _ => EntityKind::UnknownShape,
            },
        }
    }
}

impl From<Shape> for Entity {
    fn from(shape: Shape) -> Self {
        Entity::Shape(shape)
    }
}

macro_rules! entity_from_typed {
    ($($name:ident),*) => {
        $(
            impl From<$name> for Entity {
                fn from(shape: $name) -> Self {
                    Entity::$name(shape)
                }
            }
        )*
    };
}

entity_from_typed!(Vertex, Edge, Wire, Face, Shell, Solid, CompSolid, Compound);

impl From<Point3> for Entity {
    fn from(p: Point3) -> Self {
        Entity::Point(p)
    }
}

impl From<[f64; 3]> for Entity {
    fn from(xyz: [f64; 3]) -> Self {
        Entity::Point(point_from_coords(xyz))
    }
}

impl From<(f64, f64, f64)> for Entity {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Entity::Point(Point3::new(x, y, z))
    }
}

impl From<CurveId> for Entity {
    fn from(id: CurveId) -> Self {
        Entity::Curve(id)
    }
}

impl From<SurfaceId> for Entity {
    fn from(id: SurfaceId) -> Self {
        Entity::Surface(id)
    }
}

impl From<ConcreteShape> for Entity {
    fn from(shape: ConcreteShape) -> Self {
        match shape {
            ConcreteShape::Vertex(s) => Entity::Vertex(s),
            ConcreteShape::Edge(s) => Entity::Edge(s),
            ConcreteShape::Wire(s) => Entity::Wire(s),
            ConcreteShape::Face(s) => Entity::Face(s),
            ConcreteShape::Shell(s) => Entity::Shell(s),
            ConcreteShape::Solid(s) => Entity::Solid(s),
            ConcreteShape::CompSolid(s) => Entity::CompSolid(s),
            ConcreteShape::Compound(s) => Entity::Compound(s),
        }
    }
}

impl<T: Into<Entity>> From<Option<T>> for Entity {
    fn from(value: Option<T>) -> Self {
        value.map_or(Entity::Null, Into::into)
    }
}

/// A shape handle narrowed to its most specific kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcreteShape {
    /// A vertex.
    Vertex(Vertex),
    /// An edge.
    Edge(Edge),
    /// A wire.
    Wire(Wire),
    /// A face.
    Face(Face),
    /// A shell.
    Shell(Shell),
    /// A solid.
    Solid(Solid),
    /// A compsolid.
    CompSolid(CompSolid),
    /// A compound.
    Compound(Compound),
}

impl ConcreteShape {
    /// Narrow `shape` to the typed handle for `kind`.
    pub fn from_kind(shape: Shape, kind: ShapeType) -> Self {
        match kind {
            ShapeType::Vertex => ConcreteShape::Vertex(Vertex::from_shape_unchecked(shape)),
            ShapeType::Edge => ConcreteShape::Edge(Edge::from_shape_unchecked(shape)),
            ShapeType::Wire => ConcreteShape::Wire(Wire::from_shape_unchecked(shape)),
            ShapeType::Face => ConcreteShape::Face(Face::from_shape_unchecked(shape)),
            ShapeType::Shell => ConcreteShape::Shell(Shell::from_shape_unchecked(shape)),
            ShapeType::Solid => ConcreteShape::Solid(Solid::from_shape_unchecked(shape)),
            ShapeType::CompSolid => {
                ConcreteShape::CompSolid(CompSolid::from_shape_unchecked(shape))
            }
            ShapeType::Compound => ConcreteShape::Compound(Compound::from_shape_unchecked(shape)),
        }
    }

    /// The kind of the handle.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ConcreteShape::Vertex(_) => ShapeType::Vertex,
            ConcreteShape::Edge(_) => ShapeType::Edge,
            ConcreteShape::Wire(_) => ShapeType::Wire,
            ConcreteShape::Face(_) => ShapeType::Face,
            ConcreteShape::Shell(_) => ShapeType::Shell,
            ConcreteShape::Solid(_) => ShapeType::Solid,
            ConcreteShape::CompSolid(_) => ShapeType::CompSolid,
            ConcreteShape::Compound(_) => ShapeType::Compound,
        }
    }

    /// The generic handle.
    pub fn shape(&self) -> Shape {
        match *self {
            ConcreteShape::Vertex(s) => s.into(),
            ConcreteShape::Edge(s) => s.into(),
            ConcreteShape::Wire(s) => s.into(),
            ConcreteShape::Face(s) => s.into(),
            ConcreteShape::Shell(s) => s.into(),
            ConcreteShape::Solid(s) => s.into(),
            ConcreteShape::CompSolid(s) => s.into(),
            ConcreteShape::Compound(s) => s.into(),
        }
    }
}

impl From<ConcreteShape> for Shape {
    fn from(shape: ConcreteShape) -> Shape {
        shape.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afem_kernel::BRepKernel;

    #[test]
    fn test_point_like_inputs() {
        assert_eq!(Entity::from([1.0, 2.0, 3.0]), Entity::Point(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(Entity::from((1.0, 2.0, 3.0)), Entity::Point(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(Entity::from(None::<Shape>), Entity::Null);
    }

    #[test]
    fn test_observed_kinds() {
        let mut kernel = BRepKernel::new();
        let v = kernel.make_vertex(Point3::origin());
        assert_eq!(
            Entity::from(v).observed(&kernel),
            EntityKind::Shape(ShapeType::Vertex)
        );
        assert_eq!(Entity::from(Shape::null()).observed(&kernel), EntityKind::Null);
        assert_eq!(Entity::Point(Point3::origin()).observed(&kernel), EntityKind::Point);

        // A handle tagged with the wrong kind is not trusted.
        let lying = Entity::Edge(Edge::from_shape_unchecked(v.into()));
        assert_eq!(lying.resolve(&kernel), None);
        assert_eq!(lying.observed(&kernel), EntityKind::UnknownShape);
    }

    #[test]
    fn test_concrete_shape_kind() {
        let mut kernel = BRepKernel::new();
        let v = kernel.make_vertex(Point3::origin());
        let c = ConcreteShape::from_kind(v.into(), ShapeType::Vertex);
        assert_eq!(c, ConcreteShape::Vertex(v));
        assert_eq!(c.shape_type(), ShapeType::Vertex);
        assert!(c.shape().is_same(&v.into()));
    }
}
