//! Shape validity analyzer.
//!
//! Walks every distinct node under a shape once and records the defects
//! found on each. Topological checks always run; geometric checks (points
//! against curves and surfaces) only when requested.

use std::collections::HashMap;

use afem_math::{is_finite_point, Tolerance};
use afem_topo::{Orientation, Shape, ShapeData, ShapeId, ShapeType};
use tracing::trace;

use crate::analysis::{Analysis, CheckStatus};
use crate::brep::BRepKernel;

/// Slack added on top of the summed tolerances in geometric checks.
const GAP: f64 = Tolerance::DEFAULT.linear;

pub(crate) fn analyze(kernel: &BRepKernel, root: &Shape, check_geometry: bool) -> Analysis {
    let mut statuses: HashMap<ShapeId, Vec<CheckStatus>> = HashMap::new();

    if root.is_null() || !kernel.topology.contains(root) {
        statuses.insert(root.id(), vec![CheckStatus::NullShape]);
        return Analysis::new(*root, statuses);
    }

    let mut stack = vec![*root];
    while let Some(shape) = stack.pop() {
        if statuses.contains_key(&shape.id()) {
            continue;
        }
        let Some(node) = kernel.topology.node(&shape) else {
            continue;
        };

        let mut found = Vec::new();
        let kind = node.shape_type();
        for child in &node.children {
            if let Some(child_kind) = kernel.topology.shape_type(child) {
                if !kind.can_contain(child_kind) {
                    found.push(CheckStatus::InvalidSubShapeType);
                    break;
                }
            }
        }

        match &node.data {
            ShapeData::Vertex(v) => {
                if !is_finite_point(&v.point) {
                    found.push(CheckStatus::InvalidPoint);
                }
                if !valid_tolerance(v.tolerance) {
                    found.push(CheckStatus::InvalidToleranceValue);
                }
            }
            ShapeData::Edge(_) => check_edge(kernel, &shape, check_geometry, &mut found),
            ShapeData::Wire => {
                if node.children.is_empty() {
                    found.push(CheckStatus::EmptyWire);
                } else if !edges_connected(kernel, &node.children) {
                    found.push(CheckStatus::NotConnected);
                }
            }
            ShapeData::Face(_) => check_face(kernel, &shape, check_geometry, &mut found),
            ShapeData::Shell => {
                if node.children.is_empty() {
                    found.push(CheckStatus::EmptyShell);
                }
            }
            ShapeData::Solid => {
                if node.children.is_empty() {
                    found.push(CheckStatus::EmptySolid);
                }
            }
            ShapeData::CompSolid | ShapeData::Compound => {}
        }

        if found.is_empty() {
            found.push(CheckStatus::NoError);
        } else {
            trace!(%kind, ?found, "sub-shape failed checks");
        }
        statuses.insert(shape.id(), found);
        stack.extend(node.children.iter().rev().copied());
    }

    Analysis::new(*root, statuses)
}

fn valid_tolerance(tol: f64) -> bool {
    tol.is_finite() && tol >= 0.0
}

fn check_edge(kernel: &BRepKernel, edge: &Shape, check_geometry: bool, found: &mut Vec<CheckStatus>) {
    let Some(data) = kernel.edge_data(edge) else {
        return;
    };
    let curve = kernel.curve(data.curve);
    match curve {
        None => found.push(CheckStatus::No3DCurve),
        Some(c) => {
            let (lo, hi) = c.domain();
            let in_domain = data.first >= lo - GAP && data.last <= hi + GAP;
            if !data.first.is_finite() || !data.last.is_finite() || data.first >= data.last || !in_domain {
                found.push(CheckStatus::InvalidRange);
            }
        }
    }
    if !valid_tolerance(data.tolerance) {
        found.push(CheckStatus::InvalidToleranceValue);
    }
    if !data.same_parameter {
        found.push(CheckStatus::InvalidSameParameterFlag);
    }
    if !data.same_range {
        found.push(CheckStatus::InvalidSameRangeFlag);
    }

    let children = kernel
        .topology
        .node(edge)
        .map(|n| n.children.as_slice())
        .unwrap_or_default();
    let vertices: Vec<&Shape> = children
        .iter()
        .filter(|c| kernel.topology.shape_type(c) == Some(ShapeType::Vertex))
        .collect();
    let starts = vertices
        .iter()
        .filter(|v| v.orientation() == Orientation::Forward)
        .count();
    let ends = vertices.len() - starts;
    if starts != 1 || ends != 1 {
        found.push(CheckStatus::InvalidVertexCount);
        return;
    }

    if !check_geometry {
        return;
    }
    let Some(c) = curve else {
        return;
    };
    if !data.first.is_finite() || !data.last.is_finite() {
        return;
    }
    for vertex in vertices {
        let Some(v) = kernel.vertex_data(vertex) else {
            continue;
        };
        let t = match vertex.orientation() {
            Orientation::Forward => data.first,
            Orientation::Reversed => data.last,
        };
        let gap = (c.evaluate(t) - v.point).norm();
        if !(gap <= v.tolerance + data.tolerance + GAP) {
            found.push(CheckStatus::InvalidPointOnCurve);
            break;
        }
    }
}

/// Whether each edge of a wire starts where the previous one ends.
fn edges_connected(kernel: &BRepKernel, edges: &[Shape]) -> bool {
    edges.windows(2).all(|pair| {
        match (kernel.edge_ends(&pair[0]), kernel.edge_ends(&pair[1])) {
            (Some((_, end)), Some((start, _))) => kernel.vertices_meet(&end, &start),
            _ => false,
        }
    })
}

/// Whether a wire's last edge ends where its first edge starts.
fn wire_closed(kernel: &BRepKernel, edges: &[Shape]) -> bool {
    let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
        return false;
    };
    match (kernel.edge_ends(first), kernel.edge_ends(last)) {
        (Some((start, _)), Some((_, end))) => kernel.vertices_meet(&end, &start),
        _ => false,
    }
}

fn check_face(kernel: &BRepKernel, face: &Shape, check_geometry: bool, found: &mut Vec<CheckStatus>) {
    let Some(data) = kernel.face_data(face) else {
        return;
    };
    if !valid_tolerance(data.tolerance) {
        found.push(CheckStatus::InvalidToleranceValue);
    }
    let surface = kernel.surface(data.surface);
    if surface.is_none() {
        found.push(CheckStatus::NoSurface);
    }

    let wires: Vec<Shape> = kernel
        .topology
        .children(face)
        .into_iter()
        .filter(|w| kernel.topology.shape_type(w) == Some(ShapeType::Wire))
        .collect();
    for wire in &wires {
        let edges = kernel
            .topology
            .node(wire)
            .map(|n| n.children.as_slice())
            .unwrap_or_default();
        if !edges.is_empty() && !wire_closed(kernel, edges) {
            found.push(CheckStatus::NotClosed);
            break;
        }
    }

    let Some(surface) = surface.filter(|_| check_geometry) else {
        return;
    };
    for wire in &wires {
        for edge in kernel.topology.children(wire) {
            let Some(e) = kernel.edge_data(&edge) else {
                continue;
            };
            if let Some(c) = kernel.curve(e.curve) {
                let mid = c.evaluate(0.5 * (e.first + e.last));
                if !(surface.distance(&mid) <= e.tolerance + data.tolerance + GAP) {
                    found.push(CheckStatus::InvalidPointOnSurface);
                    return;
                }
            }
            for vertex in kernel.topology.children(&edge) {
                let Some(v) = kernel.vertex_data(&vertex) else {
                    continue;
                };
                if !(surface.distance(&v.point) <= v.tolerance + data.tolerance + GAP) {
                    found.push(CheckStatus::InvalidPointOnSurface);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GeometryKernel;
    use crate::primitives::make_box;
    use afem_geom::{Line3d, Plane};
    use afem_math::Point3;
    use afem_topo::{TypedShape, VertexData};

    #[test]
    fn test_box_is_valid() {
        let mut kernel = BRepKernel::new();
        let solid = make_box(&mut kernel, 1.0, 2.0, 3.0).unwrap();
        let analysis = kernel.analyze(solid.as_shape(), true);
        assert!(analysis.is_valid());
        // 1 solid, 1 shell, 6 faces, 6 wires, 12 edges, 8 vertices
        assert_eq!(analysis.len(), 34);
    }

    #[test]
    fn test_null_root() {
        let kernel = BRepKernel::new();
        let analysis = kernel.analyze(&Shape::null(), true);
        assert!(!analysis.is_valid());
    }

    #[test]
    fn test_nan_vertex() {
        let mut kernel = BRepKernel::new();
        let v = kernel.make_vertex(Point3::new(f64::NAN, 0.0, 0.0));
        let analysis = kernel.analyze(v.as_shape(), false);
        assert_eq!(analysis.status(v.as_shape()), Some(&[CheckStatus::InvalidPoint][..]));
    }

    #[test]
    fn test_edge_flags_reported() {
        let mut kernel = BRepKernel::new();
        let c = kernel.add_curve(Box::new(Line3d::from_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        )));
        let edge = kernel.make_edge(c).unwrap();
        kernel.set_same_parameter(&edge, false).unwrap();
        let analysis = kernel.analyze(edge.as_shape(), false);
        assert_eq!(
            analysis.status(edge.as_shape()),
            Some(&[CheckStatus::InvalidSameParameterFlag][..])
        );
        assert!(!analysis.is_valid());
    }

    #[test]
    fn test_vertex_off_curve_only_with_geometry() {
        let mut kernel = BRepKernel::new();
        let c = kernel.add_curve(Box::new(Line3d::from_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        )));
        let edge = kernel.make_edge(c).unwrap();
        let (start, _) = kernel.edge_ends(edge.as_shape()).unwrap();
        if let Some(node) = kernel.topology.node_mut(&start) {
            node.data = ShapeData::Vertex(VertexData {
                point: Point3::new(0.0, 0.5, 0.0),
                tolerance: 1e-7,
            });
        }
        assert!(kernel.analyze(edge.as_shape(), false).is_valid());
        let analysis = kernel.analyze(edge.as_shape(), true);
        assert_eq!(
            analysis.status(edge.as_shape()),
            Some(&[CheckStatus::InvalidPointOnCurve][..])
        );
    }

    #[test]
    fn test_illegal_nesting_and_empty_containers() {
        let mut kernel = BRepKernel::new();
        let s = kernel.add_surface(Box::new(Plane::xy()));
        let face = kernel.make_face(s, 1e-7).unwrap();
        let v = kernel.make_vertex(Point3::origin());
        kernel.add_child(face.as_shape(), v.into()).unwrap();
        let analysis = kernel.analyze(face.as_shape(), true);
        assert_eq!(
            analysis.status(face.as_shape()),
            Some(&[CheckStatus::InvalidSubShapeType][..])
        );
        assert_eq!(analysis.is_shape_valid(v.as_shape()), Some(true));

        let shell = kernel.make_shell(&[]).unwrap();
        assert_eq!(
            kernel.analyze(shell.as_shape(), true).status(shell.as_shape()),
            Some(&[CheckStatus::EmptyShell][..])
        );
    }

    #[test]
    fn test_open_wire_on_face() {
        let mut kernel = BRepKernel::new();
        let a = kernel.add_curve(Box::new(Line3d::from_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        )));
        let b = kernel.add_curve(Box::new(Line3d::from_points(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        )));
        let ea = kernel.make_edge(a).unwrap();
        let eb = kernel.make_edge(b).unwrap();
        let wire = kernel.make_wire(&[ea, eb]).unwrap();
        let s = kernel.add_surface(Box::new(Plane::xy()));
        let face = kernel.make_face_with_wires(s, &[wire]).unwrap();

        let analysis = kernel.analyze(face.as_shape(), true);
        assert_eq!(analysis.is_shape_valid(wire.as_shape()), Some(true));
        assert_eq!(
            analysis.status(face.as_shape()),
            Some(&[CheckStatus::NotClosed][..])
        );
    }
}
