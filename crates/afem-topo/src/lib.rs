#![warn(missing_docs)]

//! Topological shape hierarchy for the afem kernel.
//!
//! Defines the closed, ordered set of shape kinds ([`ShapeType`]) and the
//! rules for which kinds may contain or trivially wrap which, the
//! copyable, non-owning [`Shape`] handle together with one typed handle per
//! kind, and the slotmap-backed [`Topology`] arena the kernel stores
//! shapes in.
//!
//! Handles never own geometry. Two handles referring to the same arena
//! node are the *same* shape; orientation is carried on the handle so the
//! same edge can be used Forward by one face and Reversed by another.

mod hierarchy;
mod shape;
mod store;

pub use hierarchy::{Orientation, ShapeType, TopoState};
pub use shape::{
    downcast, CompSolid, Compound, Edge, Face, Shape, Shell, Solid, TypedShape, Vertex, Wire,
};
pub use store::{EdgeData, FaceData, ShapeData, ShapeId, ShapeNode, TopoError, Topology, VertexData};
