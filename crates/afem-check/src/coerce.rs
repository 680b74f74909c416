//! Conversion of heterogeneous inputs into specific shape kinds.
//!
//! Each `to_*` function tries its rules in a fixed order: an already-typed
//! handle of the requested kind is returned as-is, then geometry is used to
//! build a new shape, then a generic handle is narrowed by its stored kind.
//! The first rule that applies wins; otherwise the conversion fails with a
//! [`ConversionError`] naming the requested kind and what the input was.
//!
//! Which live shapes may be wrapped in a new single-member container is
//! decided by [`ShapeType::wraps_into`]: an edge into a wire, a face into a
//! shell, anything into a compound.

use afem_kernel::{GeometryKernel, KernelError};
use afem_topo::{
    downcast, CompSolid, Compound, Edge, Face, Shape, ShapeType, Shell, Solid, TypedShape, Vertex,
    Wire,
};
use tracing::debug;

use crate::entity::{ConcreteShape, Entity};
use crate::error::{ConversionError, EntityKind};

/// Return a typed handle unchanged if the kernel agrees with its tag.
fn identity<K, T>(kernel: &K, shape: T) -> Result<T, ConversionError>
where
    K: GeometryKernel + ?Sized,
    T: TypedShape,
{
    let stored = kernel.shape_type(shape.as_shape());
    downcast::<T>(*shape.as_shape(), stored).ok_or_else(|| {
        let entity = Entity::Shape(*shape.as_shape());
        ConversionError::new(T::SHAPE_TYPE, observed_for_tag(&entity, kernel, stored))
    })
}

fn observed_for_tag<K: GeometryKernel + ?Sized>(
    entity: &Entity,
    kernel: &K,
    stored: Option<ShapeType>,
) -> EntityKind {
    match stored {
        Some(kind) => EntityKind::Shape(kind),
        None => entity.observed(kernel),
    }
}

/// Narrow a live handle to `T` if its stored kind matches.
fn narrow<K, T>(kernel: &K, entity: &Entity) -> Option<T>
where
    K: GeometryKernel + ?Sized,
    T: TypedShape,
{
    let (shape, kind) = entity.resolve(kernel)?;
    downcast::<T>(shape, Some(kind))
}

fn fail<K: GeometryKernel + ?Sized>(
    kernel: &K,
    entity: &Entity,
    requested: ShapeType,
) -> ConversionError {
    let observed = entity.observed(kernel);
    debug!(%requested, %observed, "conversion failed");
    ConversionError::new(requested, observed)
}

/// Lift a kernel builder failure into a conversion failure.
fn built<K, T>(
    kernel: &K,
    entity: &Entity,
    requested: ShapeType,
    result: Result<T, KernelError>,
) -> Result<T, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    result.map_err(|err| ConversionError {
        requested,
        observed: entity.observed(kernel),
        cause: Some(err),
    })
}

/// Put `member`, a live shape of kind `kind`, into a new single-member `T`.
/// Fails unless `kind` wraps into `T`.
fn wrap<K, T>(
    kernel: &mut K,
    entity: &Entity,
    member: Shape,
    kind: ShapeType,
) -> Result<T, ConversionError>
where
    K: GeometryKernel + ?Sized,
    T: TypedShape,
{
    let target = T::SHAPE_TYPE;
    if !kind.wraps_into(target) {
        return Err(fail(kernel, entity, target));
    }
    debug!(%kind, %target, "wrapping shape");
    let result = match target {
        ShapeType::Wire => kernel
            .make_wire(&[Edge::from_shape_unchecked(member)])
            .map(|w| *w.as_shape()),
        ShapeType::Shell => kernel
            .make_shell(&[Face::from_shape_unchecked(member)])
            .map(|s| *s.as_shape()),
        ShapeType::Compound => kernel.make_compound(&[member]).map(|c| *c.as_shape()),
        _ => return Err(fail(kernel, entity, target)),
    };
    built(kernel, entity, target, result).map(T::from_shape_unchecked)
}

/// Convert to a vertex: a vertex handle as-is, a point as a new vertex, or
/// a generic vertex handle narrowed.
pub fn to_vertex<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Vertex, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Vertex(v) => identity(kernel, v),
        Entity::Point(p) => {
            debug!(?p, "building vertex from point");
            Ok(kernel.make_vertex(p))
        }
        _ => narrow(kernel, &entity).ok_or_else(|| fail(kernel, &entity, ShapeType::Vertex)),
    }
}

/// Convert to an edge: an edge handle as-is, a curve as a new edge over its
/// full domain, or a generic edge handle narrowed.
pub fn to_edge<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Edge, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Edge(e) => identity(kernel, e),
        Entity::Curve(c) if !kernel.has_curve(c) => Err(fail(kernel, &entity, ShapeType::Edge)),
        Entity::Curve(c) => {
            debug!(?c, "building edge from curve");
            let result = kernel.make_edge(c);
            built(kernel, &entity, ShapeType::Edge, result)
        }
        _ => narrow(kernel, &entity).ok_or_else(|| fail(kernel, &entity, ShapeType::Edge)),
    }
}

/// Convert to a wire: a wire handle as-is, a curve or an edge wrapped in a
/// new single-edge wire, or a generic wire handle narrowed.
pub fn to_wire<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Wire, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Wire(w) => identity(kernel, w),
        Entity::Curve(_) => {
            let edge = to_edge(kernel, entity).map_err(|e| ConversionError {
                requested: ShapeType::Wire,
                ..e
            })?;
            wrap(kernel, &entity, *edge.as_shape(), ShapeType::Edge)
        }
        _ => match entity.resolve(kernel) {
            Some((shape, ShapeType::Wire)) => Ok(Wire::from_shape_unchecked(shape)),
            Some((shape, kind)) => wrap(kernel, &entity, shape, kind),
            None => Err(fail(kernel, &entity, ShapeType::Wire)),
        },
    }
}

/// Convert to a face: a face handle as-is, a surface as a new face over its
/// natural bounds, or a generic face handle narrowed.
pub fn to_face<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Face, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Face(f) => identity(kernel, f),
        Entity::Surface(s) if !kernel.has_surface(s) => {
            Err(fail(kernel, &entity, ShapeType::Face))
        }
        Entity::Surface(s) => {
            debug!(?s, "building face from surface");
            let result = kernel.make_face(s, 0.0);
            built(kernel, &entity, ShapeType::Face, result)
        }
        _ => narrow(kernel, &entity).ok_or_else(|| fail(kernel, &entity, ShapeType::Face)),
    }
}

/// Convert to a shell: a shell handle as-is, a generic shell handle
/// narrowed, or a face (existing, or built from a surface) wrapped in a new
/// single-face shell.
pub fn to_shell<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Shell, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Shell(s) => identity(kernel, s),
        Entity::Surface(_) => {
            let face = to_face(kernel, entity).map_err(|e| ConversionError {
                requested: ShapeType::Shell,
                ..e
            })?;
            wrap(kernel, &entity, *face.as_shape(), ShapeType::Face)
        }
        _ => match entity.resolve(kernel) {
            Some((shape, ShapeType::Shell)) => Ok(Shell::from_shape_unchecked(shape)),
            Some((shape, kind)) => wrap(kernel, &entity, shape, kind),
            None => Err(fail(kernel, &entity, ShapeType::Shell)),
        },
    }
}

/// Convert to a solid. Only an existing solid converts; no solid is ever
/// built from lower kinds.
pub fn to_solid<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Solid, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::Solid(s) => identity(kernel, s),
        _ => narrow(kernel, &entity).ok_or_else(|| fail(kernel, &entity, ShapeType::Solid)),
    }
}

/// Convert to a compsolid. Only an existing compsolid converts.
pub fn to_compsolid<K>(
    kernel: &mut K,
    entity: impl Into<Entity>,
) -> Result<CompSolid, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    match entity {
        Entity::CompSolid(s) => identity(kernel, s),
        _ => narrow(kernel, &entity).ok_or_else(|| fail(kernel, &entity, ShapeType::CompSolid)),
    }
}

/// Convert to a compound: a compound handle as-is, a generic compound
/// handle narrowed, or any other live shape wrapped in a new single-member
/// compound.
pub fn to_compound<K>(kernel: &mut K, entity: impl Into<Entity>) -> Result<Compound, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    if let Entity::Compound(c) = entity {
        return identity(kernel, c);
    }
    match entity.resolve(kernel) {
        Some((shape, ShapeType::Compound)) => Ok(Compound::from_shape_unchecked(shape)),
        Some((shape, kind)) => wrap(kernel, &entity, shape, kind),
        None => Err(fail(kernel, &entity, ShapeType::Compound)),
    }
}

/// Convert to the most specific shape kind.
///
/// An absent input (`Entity::Null`) gives `Ok(None)`. A shape handle is
/// narrowed by its stored kind; a null handle is an error. Points, curves
/// and surfaces become a new vertex, edge and face.
pub fn to_shape<K>(
    kernel: &mut K,
    entity: impl Into<Entity>,
) -> Result<Option<ConcreteShape>, ConversionError>
where
    K: GeometryKernel + ?Sized,
{
    let entity = entity.into();
    let shape = match entity {
        Entity::Null => return Ok(None),
        Entity::Point(_) => ConcreteShape::Vertex(to_vertex(kernel, entity)?),
        Entity::Curve(_) => ConcreteShape::Edge(to_edge(kernel, entity)?),
        Entity::Surface(_) => ConcreteShape::Face(to_face(kernel, entity)?),
        _ => {
            // Requested kind on failure is the tag, or Compound for a generic
            // handle as the widest kind.
            let requested = entity.tag().unwrap_or(ShapeType::Compound);
            match entity.resolve(kernel) {
                Some((shape, kind)) => ConcreteShape::from_kind(shape, kind),
                None => return Err(fail(kernel, &entity, requested)),
            }
        }
    };
    Ok(Some(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use afem_geom::{Line3d, Plane};
    use afem_kernel::{make_box, BRepKernel};
    use afem_math::Point3;
    use afem_topo::Shape;

    fn line(kernel: &mut BRepKernel) -> afem_geom::CurveId {
        kernel.add_curve(Box::new(Line3d::from_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        )))
    }

    #[test]
    fn test_vertex_from_point_and_identity() {
        let mut kernel = BRepKernel::new();
        let v = to_vertex(&mut kernel, (1.0, 2.0, 3.0)).unwrap();
        assert_eq!(kernel.vertex_point(&v), Some(Point3::new(1.0, 2.0, 3.0)));
        let same = to_vertex(&mut kernel, v).unwrap();
        assert_eq!(same, v);
        let generic = to_vertex(&mut kernel, Shape::from(v)).unwrap();
        assert_eq!(generic, v);
    }

    #[test]
    fn test_edge_and_wire_from_curve() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel);
        let edge = to_edge(&mut kernel, c).unwrap();
        assert_eq!(kernel.shape_type(edge.as_shape()), Some(ShapeType::Edge));

        let wire = to_wire(&mut kernel, edge).unwrap();
        let members = kernel.children(wire.as_shape());
        assert_eq!(members.len(), 1);
        assert!(members[0].is_same(edge.as_shape()));

        let from_curve = to_wire(&mut kernel, c).unwrap();
        assert_eq!(kernel.children(from_curve.as_shape()).len(), 1);
        assert_eq!(to_wire(&mut kernel, wire).unwrap(), wire);
    }

    #[test]
    fn test_face_and_shell_from_surface() {
        let mut kernel = BRepKernel::new();
        let s = kernel.add_surface(Box::new(Plane::xy()));
        let face = to_face(&mut kernel, s).unwrap();
        assert_eq!(kernel.tolerance(face.as_shape()), Some(0.0));
        let shell = to_shell(&mut kernel, s).unwrap();
        assert_eq!(kernel.children(shell.as_shape()).len(), 1);
    }

    #[test]
    fn test_wrong_kinds_fail() {
        let mut kernel = BRepKernel::new();
        let c = line(&mut kernel);
        let err = to_face(&mut kernel, c).unwrap_err();
        assert_eq!(err, ConversionError::new(ShapeType::Face, EntityKind::Curve));
        let err = to_edge(&mut kernel, Entity::Null).unwrap_err();
        assert_eq!(err.observed, EntityKind::Null);
        let err = to_compound(&mut kernel, (0.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(err.observed, EntityKind::Point);
    }

    #[test]
    fn test_unknown_geometry_is_rejected_before_building() {
        let mut kernel = BRepKernel::new();
        let before = kernel.topology.len();

        let err = to_edge(&mut kernel, afem_geom::CurveId(42)).unwrap_err();
        assert_eq!(err, ConversionError::new(ShapeType::Edge, EntityKind::Curve));
        let err = to_wire(&mut kernel, afem_geom::CurveId(42)).unwrap_err();
        assert_eq!(err, ConversionError::new(ShapeType::Wire, EntityKind::Curve));
        let err = to_face(&mut kernel, afem_geom::SurfaceId(7)).unwrap_err();
        assert_eq!(err, ConversionError::new(ShapeType::Face, EntityKind::Surface));
        let err = to_shell(&mut kernel, afem_geom::SurfaceId(7)).unwrap_err();
        assert_eq!(err.requested, ShapeType::Shell);

        assert_eq!(kernel.topology.len(), before);
    }

    #[test]
    fn test_builder_failure_is_conversion_error() {
        let kernel = BRepKernel::new();
        let entity = Entity::Curve(afem_geom::CurveId(3));
        let result: Result<Edge, _> = Err(KernelError::InvalidRange {
            first: 1.0,
            last: 0.0,
        });
        let err = built(&kernel, &entity, ShapeType::Edge, result).unwrap_err();
        assert_eq!(err.requested, ShapeType::Edge);
        assert_eq!(err.observed, EntityKind::Curve);
        assert!(matches!(err.cause, Some(KernelError::InvalidRange { .. })));
    }

    #[test]
    fn test_wrapping_follows_the_hierarchy() {
        let mut kernel = BRepKernel::new();
        let solid = make_box(&mut kernel, 1.0, 1.0, 1.0).unwrap();
        let face = Face::from_shape_unchecked(kernel.explore(solid.as_shape(), ShapeType::Face)[0]);
        let wire = Wire::from_shape_unchecked(kernel.explore(solid.as_shape(), ShapeType::Wire)[0]);
        let edge = Edge::from_shape_unchecked(kernel.explore(solid.as_shape(), ShapeType::Edge)[0]);

        // Allowed by the table.
        let shell = to_shell(&mut kernel, Shape::from(face)).unwrap();
        assert!(kernel.children(shell.as_shape())[0].is_same(face.as_shape()));
        let single = to_wire(&mut kernel, Shape::from(edge)).unwrap();
        assert!(kernel.children(single.as_shape())[0].is_same(edge.as_shape()));

        // Not in the table, though a container could hold them.
        assert_eq!(
            to_shell(&mut kernel, wire).unwrap_err(),
            ConversionError::new(ShapeType::Shell, EntityKind::Shape(ShapeType::Wire))
        );
        assert_eq!(
            to_wire(&mut kernel, face).unwrap_err(),
            ConversionError::new(ShapeType::Wire, EntityKind::Shape(ShapeType::Face))
        );
        assert_eq!(
            to_wire(&mut kernel, solid).unwrap_err().observed,
            EntityKind::Shape(ShapeType::Solid)
        );
        assert!(!ShapeType::Wire.wraps_into(ShapeType::Shell));
        assert!(ShapeType::Solid.wraps_into(ShapeType::Compound));
    }

    #[test]
    fn test_to_shape_narrows_by_stored_kind() {
        let mut kernel = BRepKernel::new();
        let solid = make_box(&mut kernel, 1.0, 1.0, 1.0).unwrap();
        let shape = to_shape(&mut kernel, Shape::from(solid)).unwrap();
        assert_eq!(shape, Some(ConcreteShape::Solid(solid)));
        assert_eq!(to_shape(&mut kernel, Entity::Null).unwrap(), None);
        assert_eq!(
            to_shape(&mut kernel, Shape::null()).unwrap_err().observed,
            EntityKind::Null
        );
    }

    #[test]
    fn test_compound_wraps_any_shape() {
        let mut kernel = BRepKernel::new();
        let solid = make_box(&mut kernel, 1.0, 1.0, 1.0).unwrap();
        let compound = to_compound(&mut kernel, solid).unwrap();
        let members = kernel.children(compound.as_shape());
        assert_eq!(members.len(), 1);
        assert!(members[0].is_same(solid.as_shape()));
        assert_eq!(to_compound(&mut kernel, compound).unwrap(), compound);
    }
}
