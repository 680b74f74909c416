//! Point-in-solid classification for planar solids.
//!
//! Casts a ray from the query point and counts crossings with the solid's
//! faces. A point within tolerance of a face is ON that face. Solids with
//! a non-planar face, a face bounded by anything other than straight
//! edges, an unbounded face, or a boundary that does not close classify
//! as UNKNOWN.

use std::collections::HashMap;

use afem_geom::{CurveKind, Plane, Surface};
use afem_math::{is_finite_point, Point2, Point3, Vec3};
use afem_topo::{Face, Orientation, Shape, ShapeId, ShapeType, Solid, TopoState, TypedShape};
use tracing::debug;

use crate::brep::BRepKernel;
use crate::kernel::GeometryKernel;

/// Where a point lies relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidClassification {
    /// IN, OUT, ON or UNKNOWN.
    pub state: TopoState,
    /// The face the point lies on, when `state` is ON.
    pub face: Option<Face>,
}

impl SolidClassification {
    /// A result carrying no face.
    pub fn new(state: TopoState) -> Self {
        Self { state, face: None }
    }

    /// The UNKNOWN result.
    pub fn unknown() -> Self {
        Self::new(TopoState::Unknown)
    }
}

/// Ray directions tried in turn, tilted off the coordinate axes so that
/// axis-aligned models rarely put a hit on an edge.
const RAY_DIRECTIONS: [[f64; 3]; 4] = [
    [1.0, 2.3e-3, 3.7e-3],
    [3.1e-3, 1.0, 1.7e-3],
    [2.9e-3, 4.1e-3, 1.0],
    [-1.0, 1.3e-3, -2.2e-3],
];

/// A planar face flattened into the plane's parameter space.
struct PlanarFace {
    face: Face,
    plane: Plane,
    /// Boundary loops as 3D corner points.
    loops: Vec<Vec<Point3>>,
    /// The same loops projected onto the plane.
    loops_2d: Vec<Vec<Point2>>,
}

impl PlanarFace {
    fn contains(&self, p: &Point3) -> bool {
        let uv = self.plane.project(p);
        let mut inside = false;
        for poly in &self.loops_2d {
            if point_in_polygon(&uv, poly) {
                inside = !inside;
            }
        }
        inside
    }

    fn boundary_distance(&self, p: &Point3) -> f64 {
        self.loops
            .iter()
            .flat_map(|poly| {
                (0..poly.len()).map(move |i| (poly[i], poly[(i + 1) % poly.len()]))
            })
            .map(|(a, b)| distance_to_segment(p, &a, &b))
            .fold(f64::INFINITY, f64::min)
    }
}

pub(crate) fn classify_point(
    kernel: &BRepKernel,
    solid: &Solid,
    point: &Point3,
    tolerance: f64,
) -> SolidClassification {
    if !is_finite_point(point) || !tolerance.is_finite() || tolerance < 0.0 {
        return SolidClassification::unknown();
    }
    let Some(faces) = planar_faces(kernel, solid.as_shape()) else {
        debug!("solid has a face that is not a bounded planar polygon, cannot classify");
        return SolidClassification::unknown();
    };
    if faces.is_empty() {
        return SolidClassification::unknown();
    }
    if !is_closed_boundary(kernel, solid.as_shape()) {
        debug!("solid boundary is open, cannot classify");
        return SolidClassification::unknown();
    }

    for face in &faces {
        if face.plane.distance(point) <= tolerance
            && (face.contains(point) || face.boundary_distance(point) <= tolerance)
        {
            return SolidClassification {
                state: TopoState::On,
                face: Some(face.face),
            };
        }
    }

    'directions: for dir in RAY_DIRECTIONS {
        let dir = Vec3::new(dir[0], dir[1], dir[2]).normalize();
        let mut crossings = 0usize;
        for face in &faces {
            let n = face.plane.normal_dir.into_inner();
            let denom = dir.dot(&n);
            let offset = face.plane.signed_distance(point);
            if denom.abs() < 1e-12 {
                if offset.abs() <= tolerance {
                    continue 'directions;
                }
                continue;
            }
            let t = -offset / denom;
            if t <= 0.0 {
                continue;
            }
            let hit = point + t * dir;
            if face.boundary_distance(&hit) <= tolerance {
                continue 'directions;
            }
            if face.contains(&hit) {
                crossings += 1;
            }
        }
        let state = if crossings % 2 == 1 {
            TopoState::In
        } else {
            TopoState::Out
        };
        debug!(%state, crossings, "classified point");
        return SolidClassification::new(state);
    }

    debug!("every ray grazed a face boundary");
    SolidClassification::unknown()
}

/// Flatten every face of `solid`, or `None` if any face is not a planar
/// polygon. A face with no boundary loop, or a loop of fewer than three
/// edges, encloses no area and also gives `None`.
fn planar_faces(kernel: &BRepKernel, solid: &Shape) -> Option<Vec<PlanarFace>> {
    let mut out = Vec::new();
    for face_shape in kernel.explore(solid, ShapeType::Face) {
        let data = kernel.face_data(&face_shape)?;
        let plane = kernel
            .surface(data.surface)?
            .as_any()
            .downcast_ref::<Plane>()?
            .clone();

        let mut loops = Vec::new();
        for wire in kernel.children(&face_shape) {
            let mut corners = Vec::new();
            for edge in kernel.children(&wire) {
                let e = kernel.edge_data(&edge)?;
                if kernel.curve(e.curve)?.curve_type() != CurveKind::Line {
                    return None;
                }
                let (start, _) = kernel.edge_ends(&edge)?;
                corners.push(kernel.vertex_data(&start)?.point);
            }
            if corners.len() < 3 {
                return None;
            }
            loops.push(corners);
        }
        if loops.is_empty() {
            return None;
        }
        let loops_2d = loops
            .iter()
            .map(|poly| poly.iter().map(|p| plane.project(p)).collect())
            .collect();
        out.push(PlanarFace {
            face: Face::from_shape_unchecked(face_shape),
            plane,
            loops,
            loops_2d,
        });
    }
    Some(out)
}

/// Whether every edge on the faces of `solid` is used exactly once Forward
/// and once Reversed. Crossing parity means nothing for anything else.
fn is_closed_boundary(kernel: &BRepKernel, solid: &Shape) -> bool {
    let mut uses: HashMap<ShapeId, (usize, usize)> = HashMap::new();
    for face in kernel.explore(solid, ShapeType::Face) {
        for wire in kernel.children(&face) {
            for edge in kernel.children(&wire) {
                let entry = uses.entry(edge.id()).or_default();
                match edge.orientation() {
                    Orientation::Forward => entry.0 += 1,
                    Orientation::Reversed => entry.1 += 1,
                }
            }
        }
    }
    uses.values().all(|&n| n == (1, 1))
}

/// Even-odd test of a point against one polygon.
fn point_in_polygon(p: &Point2, poly: &[Point2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + t * ab)).norm()
}
