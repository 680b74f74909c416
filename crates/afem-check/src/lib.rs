#![warn(missing_docs)]

//! Shape coercion, validation and point classification for afem.
//!
//! This crate sits on top of any [`GeometryKernel`](afem_kernel::GeometryKernel):
//!
//! - the `to_*` functions turn points, curves, surfaces and shape handles of
//!   any kind into a requested shape kind, building new shapes only where a
//!   trivial construction exists;
//! - [`ShapeValidator`] runs the kernel's analyzer and lists the defective
//!   sub-shapes;
//! - [`PointClassifier`] answers IN / OUT / ON queries against a solid.
//!
//! # Example
//!
//! ```
//! use afem_check::{to_shell, to_solid, to_vertex, EntityKind, ShapeValidator};
//! use afem_geom::Plane;
//! use afem_kernel::{BRepKernel, GeometryKernel};
//! use afem_topo::ShapeType;
//!
//! let mut kernel = BRepKernel::new();
//! let v = to_vertex(&mut kernel, (1.0, 2.0, 3.0)).unwrap();
//! assert!(ShapeValidator::new(&kernel, v, true, false).unwrap().is_valid());
//!
//! let surface = kernel.add_surface(Box::new(Plane::xy()));
//! let face = kernel.make_face(surface, 0.0).unwrap();
//! let shell = to_shell(&mut kernel, face).unwrap();
//! assert_eq!(kernel.children(&shell.into()).len(), 1);
//!
//! let err = to_solid(&mut kernel, face).unwrap_err();
//! assert_eq!(err.requested, ShapeType::Solid);
//! assert_eq!(err.observed, EntityKind::Shape(ShapeType::Face));
//! ```

mod classify;
mod coerce;
mod config;
mod entity;
mod error;
mod tools;
mod validate;

pub use classify::{PointClassifier, DEFAULT_TOLERANCE};
pub use coerce::{
    to_compound, to_compsolid, to_edge, to_face, to_shape, to_shell, to_solid, to_vertex, to_wire,
};
pub use config::CheckConfig;
pub use entity::{ConcreteShape, Entity};
pub use error::{CheckError, ConfigError, ConversionError, EntityKind, InvalidShapeError, Result};
pub use tools::{
    is_compound, is_compsolid, is_edge, is_face, is_shape, is_shell, is_solid, is_vertex, is_wire,
    tolerance, ToleranceMode,
};
pub use validate::ShapeValidator;
