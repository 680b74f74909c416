//! Box primitive construction.

use std::collections::HashMap;

use afem_geom::{Line3d, Plane};
use afem_math::{Point3, Vec3};
use afem_topo::{Edge, Solid, Vertex};

use crate::brep::BRepKernel;
use crate::error::{KernelError, Result};
use crate::kernel::GeometryKernel;

/// Build a box with one corner at the origin and extents `(sx, sy, sz)`.
///
/// The box has 6 planar faces, 12 line edges and 8 vertices, with every
/// edge shared by its two faces in opposite orientations.
/// Vertex layout:
/// ```text
///     v4----v5
///    /|    /|
///   v7----v6|    z
///   | v0--|-v1   | y
///   |/    |/     |/
///   v3----v2     +---x
/// ```
pub fn make_box(kernel: &mut BRepKernel, sx: f64, sy: f64, sz: f64) -> Result<Solid> {
    make_box_at(kernel, Point3::origin(), sx, sy, sz)
}

/// Build a box with extents `(sx, sy, sz)` centered on the origin.
pub fn make_centered_box(kernel: &mut BRepKernel, sx: f64, sy: f64, sz: f64) -> Result<Solid> {
    make_box_at(kernel, Point3::new(-0.5 * sx, -0.5 * sy, -0.5 * sz), sx, sy, sz)
}

fn make_box_at(kernel: &mut BRepKernel, corner: Point3, sx: f64, sy: f64, sz: f64) -> Result<Solid> {
    for extent in [sx, sy, sz] {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(KernelError::InvalidRange {
                first: 0.0,
                last: extent,
            });
        }
    }

    let at = |x: f64, y: f64, z: f64| corner + Vec3::new(x, y, z);
    let points = [
        at(0.0, 0.0, 0.0),
        at(sx, 0.0, 0.0),
        at(sx, sy, 0.0),
        at(0.0, sy, 0.0),
        at(0.0, 0.0, sz),
        at(sx, 0.0, sz),
        at(sx, sy, sz),
        at(0.0, sy, sz),
    ];
    let vertices: Vec<Vertex> = points.iter().map(|p| kernel.make_vertex(*p)).collect();

    // Corners in CCW order seen from outside; plane normal = x_dir × y_dir.
    let face_defs: [([usize; 4], Vec3, Vec3); 6] = [
        // Bottom (-Z)
        ([0, 3, 2, 1], Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        // Top (+Z)
        ([4, 5, 6, 7], Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        // Front (-Y)
        ([0, 1, 5, 4], Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)),
        // Back (+Y)
        ([2, 3, 7, 6], Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        // Left (-X)
        ([0, 4, 7, 3], Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        // Right (+X)
        ([1, 2, 6, 5], Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ];

    // Each edge is stored once, keyed by (from, to) in its first direction of use.
    let mut edges: HashMap<(usize, usize), Edge> = HashMap::new();
    let mut faces = Vec::with_capacity(6);

    for (corners, x_dir, y_dir) in face_defs {
        let mut loop_edges = Vec::with_capacity(4);
        for j in 0..4 {
            let (a, b) = (corners[j], corners[(j + 1) % 4]);
            let edge = if let Some(e) = edges.get(&(b, a)) {
                e.reversed()
            } else {
                let curve = kernel.add_curve(Box::new(Line3d::from_points(points[a], points[b])));
                let e = kernel.make_edge_between(curve, 0.0, 1.0, vertices[a], vertices[b])?;
                edges.insert((a, b), e);
                e
            };
            loop_edges.push(edge);
        }
        let wire = kernel.make_wire(&loop_edges)?;
        let plane = Plane::new(points[corners[0]], x_dir, y_dir);
        let surface = kernel.add_surface(Box::new(plane));
        faces.push(kernel.make_face_with_wires(surface, &[wire])?);
    }

    let shell = kernel.make_shell(&faces)?;
    kernel.make_solid(&[shell])
}
