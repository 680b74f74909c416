//! Shape predicates and tolerance queries.

use afem_kernel::GeometryKernel;
use afem_topo::{Shape, ShapeType};

use crate::entity::Entity;

/// Whether `entity` is a live shape handle the kernel agrees with.
pub fn is_shape<K: GeometryKernel + ?Sized>(kernel: &K, entity: impl Into<Entity>) -> bool {
    entity.into().resolve(kernel).is_some()
}

fn is_kind<K: GeometryKernel + ?Sized>(kernel: &K, entity: Entity, kind: ShapeType) -> bool {
    matches!(entity.resolve(kernel), Some((_, k)) if k == kind)
}

macro_rules! kind_predicate {
    ($($(#[$meta:meta])* $fn_name:ident => $kind:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name<K: GeometryKernel + ?Sized>(kernel: &K, entity: impl Into<Entity>) -> bool {
                is_kind(kernel, entity.into(), ShapeType::$kind)
            }
        )*
    };
}

kind_predicate! {
    /// Whether `entity` is a stored vertex.
    is_vertex => Vertex;
    /// Whether `entity` is a stored edge.
    is_edge => Edge;
    /// Whether `entity` is a stored wire.
    is_wire => Wire;
    /// Whether `entity` is a stored face.
    is_face => Face;
    /// Whether `entity` is a stored shell.
    is_shell => Shell;
    /// Whether `entity` is a stored solid.
    is_solid => Solid;
    /// Whether `entity` is a stored compsolid.
    is_compsolid => CompSolid;
    /// Whether `entity` is a stored compound.
    is_compound => Compound;
}

/// How [`tolerance`] folds sub-shape tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToleranceMode {
    /// Arithmetic mean.
    #[default]
    Average,
    /// Largest value.
    Max,
    /// Smallest value.
    Min,
}

/// Fold the tolerances of every distinct vertex, edge and face under
/// `shape`. `None` if there are none.
pub fn tolerance<K: GeometryKernel + ?Sized>(
    kernel: &K,
    shape: &Shape,
    mode: ToleranceMode,
) -> Option<f64> {
    let values: Vec<f64> = [ShapeType::Vertex, ShapeType::Edge, ShapeType::Face]
        .into_iter()
        .flat_map(|kind| kernel.explore(shape, kind))
        .filter_map(|s| kernel.tolerance(&s))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(match mode {
        ToleranceMode::Average => values.iter().sum::<f64>() / values.len() as f64,
        ToleranceMode::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ToleranceMode::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use afem_geom::Plane;
    use afem_kernel::{make_box, BRepKernel};
    use afem_math::Point3;
    use afem_topo::TypedShape;

    #[test]
    fn test_predicates() {
        let mut kernel = BRepKernel::new();
        let v = kernel.make_vertex(Point3::origin());
        assert!(is_shape(&kernel, v));
        assert!(is_vertex(&kernel, Shape::from(v)));
        assert!(!is_edge(&kernel, v));
        assert!(!is_shape(&kernel, Shape::null()));
        assert!(!is_shape(&kernel, (1.0, 2.0, 3.0)));
        assert!(!is_vertex(&kernel, Entity::Null));
    }

    #[test]
    fn test_tolerance_modes() {
        let mut kernel = BRepKernel::new();
        let solid = make_box(&mut kernel, 1.0, 1.0, 1.0).unwrap();
        let s = kernel.add_surface(Box::new(Plane::xy()));
        let face = kernel.make_face(s, 1e-3).unwrap();
        let compound = kernel.make_compound(&[solid.into(), face.into()]).unwrap();

        let max = tolerance(&kernel, compound.as_shape(), ToleranceMode::Max).unwrap();
        let min = tolerance(&kernel, compound.as_shape(), ToleranceMode::Min).unwrap();
        let avg = tolerance(&kernel, compound.as_shape(), ToleranceMode::Average).unwrap();
        assert_eq!(max, 1e-3);
        assert_eq!(min, 1e-7);
        assert!(avg > min && avg < max);

        let empty = kernel.make_compound(&[]).unwrap();
        assert_eq!(tolerance(&kernel, empty.as_shape(), ToleranceMode::Max), None);
    }
}
