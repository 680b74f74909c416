//! Non-owning shape handles.

use slotmap::Key;

use crate::hierarchy::{Orientation, ShapeType};
use crate::store::ShapeId;

/// A reference to a shape stored in a kernel's [`Topology`](crate::Topology).
///
/// Handles are `Copy` and never own geometry. Equality compares the
/// referenced node *and* the orientation; use [`Shape::is_same`] to
/// ignore orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    id: ShapeId,
    orientation: Orientation,
}

impl Shape {
    /// A handle to the stored node `id`, oriented Forward.
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            orientation: Orientation::Forward,
        }
    }

    /// The null handle. It refers to no node in any arena.
    pub fn null() -> Self {
        Self::new(ShapeId::null())
    }

    /// Whether this is the null handle.
    pub fn is_null(&self) -> bool {
        self.id.is_null()
    }

    /// The referenced node.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// The handle's orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The same node with the given orientation.
    pub fn oriented(self, orientation: Orientation) -> Self {
        Self { orientation, ..self }
    }

    /// The same node with the opposite orientation.
    pub fn reversed(self) -> Self {
        self.oriented(self.orientation.reversed())
    }

    /// Whether both handles refer to the same node, regardless of orientation.
    pub fn is_same(&self, other: &Shape) -> bool {
        self.id == other.id
    }
}

/// A handle statically known to refer to one [`ShapeType`].
pub trait TypedShape: Copy + Into<Shape> {
    /// The kind every handle of this type refers to.
    const SHAPE_TYPE: ShapeType;

    /// Wrap a generic handle without checking its kind.
    ///
    /// The caller must know the arena reports [`Self::SHAPE_TYPE`] for
    /// `shape`; kernels use this for shapes they have just built.
    fn from_shape_unchecked(shape: Shape) -> Self;

    /// The generic handle.
    fn as_shape(&self) -> &Shape;
}

/// Narrow a generic handle to a typed one, given the kind the arena
/// reports for it. Returns `None` on a kind mismatch or unknown kind.
pub fn downcast<T: TypedShape>(shape: Shape, observed: Option<ShapeType>) -> Option<T> {
    (observed == Some(T::SHAPE_TYPE)).then(|| T::from_shape_unchecked(shape))
}

macro_rules! typed_shape {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Shape);

        impl $name {
            /// The node id of the underlying shape.
            pub fn id(&self) -> ShapeId {
                self.0.id()
            }

            /// The handle's orientation.
            pub fn orientation(&self) -> Orientation {
                self.0.orientation()
            }

            /// The same shape with the opposite orientation.
            pub fn reversed(self) -> Self {
                Self(self.0.reversed())
            }

            /// Whether both handles refer to the same node, regardless of orientation.
            pub fn is_same(&self, other: &impl TypedShape) -> bool {
                self.0.is_same(other.as_shape())
            }
        }

        impl TypedShape for $name {
            const SHAPE_TYPE: ShapeType = ShapeType::$kind;

            fn from_shape_unchecked(shape: Shape) -> Self {
                Self(shape)
            }

            fn as_shape(&self) -> &Shape {
                &self.0
            }
        }

        impl From<$name> for Shape {
            fn from(typed: $name) -> Shape {
                typed.0
            }
        }
    };
}

typed_shape!(
    /// Handle to a vertex.
    Vertex => Vertex
);
typed_shape!(
    /// Handle to an edge.
    Edge => Edge
);
typed_shape!(
    /// Handle to a wire.
    Wire => Wire
);
typed_shape!(
    /// Handle to a face.
    Face => Face
);
typed_shape!(
    /// Handle to a shell.
    Shell => Shell
);
typed_shape!(
    /// Handle to a solid.
    Solid => Solid
);
typed_shape!(
    /// Handle to a compsolid.
    CompSolid => CompSolid
);
typed_shape!(
    /// Handle to a compound.
    Compound => Compound
);
