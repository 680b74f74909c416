//! The shape-type hierarchy: kinds, containment and wrapping rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Topological kind of a shape.
///
/// Ordered by dimensional/containment nesting: `Vertex < Edge < Wire <
/// Face < Shell < Solid < CompSolid < Compound`. The order is not a
/// coercion order; see [`ShapeType::wraps_into`] for that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ShapeType {
    /// A point with a tolerance.
    Vertex,
    /// A bounded piece of a curve between vertices.
    Edge,
    /// A connected sequence of edges.
    Wire,
    /// A bounded piece of a surface.
    Face,
    /// A set of faces connected by their edges.
    Shell,
    /// A region of space bounded by shells.
    Solid,
    /// A set of solids connected by their faces.
    CompSolid,
    /// An arbitrary group of shapes.
    Compound,
}

impl ShapeType {
    /// Every kind, in hierarchy order.
    pub const ALL: [ShapeType; 8] = [
        ShapeType::Vertex,
        ShapeType::Edge,
        ShapeType::Wire,
        ShapeType::Face,
        ShapeType::Shell,
        ShapeType::Solid,
        ShapeType::CompSolid,
        ShapeType::Compound,
    ];

    /// Whether a shape of this kind may directly contain a `child` kind.
    pub fn can_contain(self, child: ShapeType) -> bool {
        match self {
            ShapeType::Vertex => false,
            ShapeType::Edge => child == ShapeType::Vertex,
            ShapeType::Wire => child == ShapeType::Edge,
            ShapeType::Face => child == ShapeType::Wire,
            ShapeType::Shell => child == ShapeType::Face,
            ShapeType::Solid => child == ShapeType::Shell,
            ShapeType::CompSolid => child == ShapeType::Solid,
            ShapeType::Compound => true,
        }
    }

    /// Whether a shape of this kind can become a `target` by being placed,
    /// alone, in a new trivial container.
    ///
    /// Edge → Wire and Face → Shell are single-member containers; any
    /// kind wraps into a single-member Compound.
    pub fn wraps_into(self, target: ShapeType) -> bool {
        matches!(
            (self, target),
            (_, ShapeType::Compound) | (ShapeType::Edge, ShapeType::Wire) | (ShapeType::Face, ShapeType::Shell)
        )
    }

    /// Lowercase name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Vertex => "vertex",
            ShapeType::Edge => "edge",
            ShapeType::Wire => "wire",
            ShapeType::Face => "face",
            ShapeType::Shell => "shell",
            ShapeType::Solid => "solid",
            ShapeType::CompSolid => "compsolid",
            ShapeType::Compound => "compound",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orientation of a shape handle relative to its stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Same sense as the stored node.
    #[default]
    Forward,
    /// Opposite sense to the stored node.
    Reversed,
}

impl Orientation {
    /// The opposite orientation.
    pub fn reversed(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }

    /// Orientation of a child as seen through a parent with orientation `outer`.
    pub fn compose(self, outer: Orientation) -> Self {
        match outer {
            Orientation::Forward => self,
            Orientation::Reversed => self.reversed(),
        }
    }
}

/// Position of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopoState {
    /// Strictly inside.
    In,
    /// Strictly outside.
    Out,
    /// On the boundary, within tolerance.
    On,
    /// Not classified, or the classifier could not decide.
    #[default]
    Unknown,
}

impl fmt::Display for TopoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TopoState::In => "IN",
            TopoState::Out => "OUT",
            TopoState::On => "ON",
            TopoState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_order() {
        for pair in ShapeType::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(ShapeType::Vertex < ShapeType::Compound);
    }

    #[test]
    fn test_containment_table() {
        assert!(ShapeType::Edge.can_contain(ShapeType::Vertex));
        assert!(ShapeType::Wire.can_contain(ShapeType::Edge));
        assert!(ShapeType::Face.can_contain(ShapeType::Wire));
        assert!(ShapeType::Shell.can_contain(ShapeType::Face));
        assert!(ShapeType::Solid.can_contain(ShapeType::Shell));
        assert!(ShapeType::CompSolid.can_contain(ShapeType::Solid));
        assert!(!ShapeType::Wire.can_contain(ShapeType::Face));
        assert!(!ShapeType::Vertex.can_contain(ShapeType::Vertex));
        for kind in ShapeType::ALL {
            assert!(ShapeType::Compound.can_contain(kind));
        }
    }

    #[test]
    fn test_wrapping_rules() {
        assert!(ShapeType::Edge.wraps_into(ShapeType::Wire));
        assert!(ShapeType::Face.wraps_into(ShapeType::Shell));
        assert!(!ShapeType::Face.wraps_into(ShapeType::Solid));
        assert!(!ShapeType::Shell.wraps_into(ShapeType::Solid));
        assert!(!ShapeType::Vertex.wraps_into(ShapeType::Edge));
        for kind in ShapeType::ALL {
            assert!(kind.wraps_into(ShapeType::Compound));
        }
    }

    #[test]
    fn test_orientation_compose() {
        use Orientation::*;
        assert_eq!(Forward.compose(Forward), Forward);
        assert_eq!(Forward.compose(Reversed), Reversed);
        assert_eq!(Reversed.compose(Reversed), Forward);
        assert_eq!(Reversed.reversed(), Forward);
    }

    #[test]
    fn test_display() {
        assert_eq!(ShapeType::CompSolid.to_string(), "compsolid");
        assert_eq!(TopoState::default(), TopoState::Unknown);
        assert_eq!(TopoState::On.to_string(), "ON");
    }
}
