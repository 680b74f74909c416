#![warn(missing_docs)]

//! Curves and surfaces that edges and faces are built on.
//!
//! Geometry is held as trait objects in a [`GeometryStore`] and referred
//! to from topology through [`CurveId`] and [`SurfaceId`]. The checking
//! layer only needs point evaluation on curves, point-to-surface distance
//! and a way to recognise planes, so that is all the traits expose.

use std::any::Any;
use std::f64::consts::TAU;

use afem_math::{Dir3, Point2, Point3, Vec3};
use serde::{Deserialize, Serialize};

/// A surface a face lies on.
pub trait Surface: Send + Sync + std::fmt::Debug {
    /// Unsigned distance from `p` to the surface.
    fn distance(&self, p: &Point3) -> f64;

    /// Boxed copy.
    fn clone_box(&self) -> Box<dyn Surface>;

    /// For recovering the concrete type, e.g. `Plane` in the classifier.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Surface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Unbounded plane with an in-plane frame.
///
/// `(u, v)` coordinates are measured along `x_dir` and `y_dir` from
/// `origin`; the normal is `x_dir × y_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3,
    /// First in-plane axis.
    pub x_dir: Dir3,
    /// Second in-plane axis.
    pub y_dir: Dir3,
    /// Unit normal.
    pub normal_dir: Dir3,
}

impl Plane {
    /// Plane through `origin` spanned by two non-parallel directions.
    pub fn new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Self {
        Self {
            origin,
            x_dir: Dir3::new_normalize(x_dir),
            y_dir: Dir3::new_normalize(y_dir),
            normal_dir: Dir3::new_normalize(x_dir.cross(&y_dir)),
        }
    }

    /// The `z = 0` plane.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vec3::x(), Vec3::y())
    }

    /// In-plane `(u, v)` coordinates of `p` after dropping it onto the plane.
    pub fn project(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal_dir.as_ref())
    }
}

impl Surface for Plane {
    fn distance(&self, p: &Point3) -> f64 {
        self.signed_distance(p).abs()
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Infinite cylinder around the Z axis.
#[derive(Debug, Clone)]
pub struct CylinderSurface {
    /// Distance from the axis.
    pub radius: f64,
}

impl CylinderSurface {
    /// Cylinder of `radius` around the Z axis.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Surface for CylinderSurface {
    fn distance(&self, p: &Point3) -> f64 {
        (p.x.hypot(p.y) - self.radius).abs()
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Curve families the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Straight segment.
    Line,
    /// Full circle.
    Circle,
}

/// A parametric curve an edge runs along.
pub trait Curve3d: Send + Sync + std::fmt::Debug {
    /// Point at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// Natural parameter range, used when an edge spans the whole curve.
    fn domain(&self) -> (f64, f64);

    /// Which family the curve belongs to.
    fn curve_type(&self) -> CurveKind;

    /// Boxed copy.
    fn clone_box(&self) -> Box<dyn Curve3d>;
}

impl Clone for Box<dyn Curve3d> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Segment from `start` (t = 0) to `end` (t = 1).
#[derive(Debug, Clone)]
pub struct Line3d {
    /// Point at t = 0.
    pub start: Point3,
    /// Point at t = 1.
    pub end: Point3,
}

impl Line3d {
    /// Segment between two points.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }
}

impl Curve3d for Line3d {
    fn evaluate(&self, t: f64) -> Point3 {
        self.start + t * (self.end - self.start)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Line
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }
}

/// Circle parallel to the XY plane, starting on +X and running
/// counter-clockwise over `[0, 2π]`.
#[derive(Debug, Clone)]
pub struct Circle3d {
    /// Centre.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
}

impl Circle3d {
    /// Circle around `center` in the plane `z = center.z`.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Curve3d for Circle3d {
    fn evaluate(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + Vec3::new(self.radius * c, self.radius * s, 0.0)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Circle
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }
}

/// Index of a curve in a [`GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurveId(pub usize);

/// Index of a surface in a [`GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub usize);

/// Append-only owner of every curve and surface in a model.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    surfaces: Vec<Box<dyn Surface>>,
    curves: Vec<Box<dyn Curve3d>>,
}

impl GeometryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a surface.
    pub fn add_surface(&mut self, surface: Box<dyn Surface>) -> SurfaceId {
        self.surfaces.push(surface);
        SurfaceId(self.surfaces.len() - 1)
    }

    /// Take ownership of a curve.
    pub fn add_curve_3d(&mut self, curve: Box<dyn Curve3d>) -> CurveId {
        self.curves.push(curve);
        CurveId(self.curves.len() - 1)
    }

    /// `None` for an id this store never handed out.
    pub fn surface(&self, id: SurfaceId) -> Option<&dyn Surface> {
        self.surfaces.get(id.0).map(|s| s.as_ref())
    }

    /// `None` for an id this store never handed out.
    pub fn curve(&self, id: CurveId) -> Option<&dyn Curve3d> {
        self.curves.get(id.0).map(|c| c.as_ref())
    }
}
