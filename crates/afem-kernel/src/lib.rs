#![warn(missing_docs)]

//! Geometry-kernel capability interface for the afem shape-checking layer.
//!
//! [`GeometryKernel`] is everything the checking layer needs from a B-rep
//! kernel: shape-type queries, builders, the validity analyzer, the seam
//! test, edge metadata reads and point-in-solid classification.
//! [`BRepKernel`] is the in-process implementation: it owns a
//! [`Topology`](afem_topo::Topology) arena and a
//! [`GeometryStore`](afem_geom::GeometryStore), and hands out non-owning
//! shape handles.
//!
//! # Example
//!
//! ```
//! use afem_kernel::{make_centered_box, BRepKernel, GeometryKernel};
//! use afem_math::Point3;
//! use afem_topo::TopoState;
//!
//! let mut kernel = BRepKernel::new();
//! let cube = make_centered_box(&mut kernel, 1.0, 1.0, 1.0).unwrap();
//! assert!(kernel.analyze(&cube.into(), true).is_valid());
//!
//! let result = kernel.classify(&cube, &Point3::origin(), 1e-7);
//! assert_eq!(result.state, TopoState::In);
//! ```

mod analysis;
mod brep;
mod check;
mod classify;
mod error;
mod kernel;
mod primitives;

pub use analysis::{Analysis, CheckStatus};
pub use brep::BRepKernel;
pub use classify::SolidClassification;
pub use error::{KernelError, Result};
pub use kernel::GeometryKernel;
pub use primitives::{make_box, make_centered_box};
