#![warn(missing_docs)]

//! Math types for the afem shape-checking layer.
//!
//! Thin aliases over nalgebra for points, vectors and directions, plus
//! the tolerance constants shared by the kernel and the checking layer.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// Build a point from a coordinate triple.
pub fn point_from_coords(xyz: [f64; 3]) -> Point3 {
    Point3::new(xyz[0], xyz[1], xyz[2])
}

/// Whether every coordinate of a point is finite.
pub fn is_finite_point(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Distance below which two points are the same point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Model units.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-7, the precision new vertices, edges and faces are created with.
    pub const DEFAULT: Self = Self { linear: 1e-7 };

    /// Whether `a` and `b` coincide.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() <= self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_from_coords() {
        let p = point_from_coords([1.0, 2.0, 3.0]);
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_is_finite_point() {
        assert!(is_finite_point(&Point3::new(1.0, -2.0, 0.0)));
        assert!(!is_finite_point(&Point3::new(f64::NAN, 0.0, 0.0)));
        assert!(!is_finite_point(&Point3::new(0.0, f64::INFINITY, 0.0)));
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-8, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_tolerance_default() {
        assert_eq!(Tolerance::default(), Tolerance::DEFAULT);
        let loose = Tolerance { linear: 1e-2 };
        assert!(loose.points_equal(&Point3::origin(), &Point3::new(0.0, 5e-3, 0.0)));
        assert!(!Tolerance::DEFAULT.points_equal(&Point3::origin(), &Point3::new(0.0, 5e-3, 0.0)));
    }
}
