//! Point classification against a solid.

use afem_kernel::{GeometryKernel, SolidClassification};
use afem_math::Point3;
use afem_topo::{Face, ShapeType, Solid, TopoState, TypedShape, Vertex};
use tracing::debug;

use crate::config::CheckConfig;
use crate::entity::Entity;
use crate::error::{CheckError, ConversionError, InvalidShapeError};

/// Default classification tolerance, in model units.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-7;

/// Classifies points against one solid.
///
/// Holds the result of the last [`perform`](Self::perform); before the
/// first one the state is UNKNOWN.
#[derive(Debug)]
pub struct PointClassifier<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
    solid: Solid,
    result: SolidClassification,
}

impl<'k, K: GeometryKernel + ?Sized> PointClassifier<'k, K> {
    /// A classifier for `solid`.
    ///
    /// `point` takes the same inputs as [`perform`](Self::perform) and is
    /// classified right away; pass [`Entity::Null`] (or a `None`) to start
    /// UNKNOWN.
    pub fn new(
        kernel: &'k K,
        solid: Solid,
        point: impl Into<Entity>,
        tolerance: f64,
    ) -> Result<Self, CheckError> {
        if kernel.shape_type(solid.as_shape()) != Some(ShapeType::Solid) {
            return Err(InvalidShapeError {
                operation: "point classification",
            }
            .into());
        }
        let mut classifier = Self {
            kernel,
            solid,
            result: SolidClassification::unknown(),
        };
        let point = point.into();
        if !matches!(point, Entity::Null) {
            classifier.perform(point, tolerance)?;
        }
        Ok(classifier)
    }

    /// A classifier using the tolerance in `config`.
    pub fn with_config(
        kernel: &'k K,
        solid: Solid,
        point: impl Into<Entity>,
        config: &CheckConfig,
    ) -> Result<Self, CheckError> {
        Self::new(kernel, solid, point, config.classify_tolerance)
    }

    /// Classify a new point, replacing the previous result.
    ///
    /// Accepts a point or coordinates, or a vertex handle whose location
    /// is used.
    pub fn perform(
        &mut self,
        point: impl Into<Entity>,
        tolerance: f64,
    ) -> Result<(), ConversionError> {
        let p = location(self.kernel, &point.into())?;
        self.classify(&p, tolerance);
        Ok(())
    }

    fn classify(&mut self, point: &Point3, tolerance: f64) {
        self.result = self.kernel.classify(&self.solid, point, tolerance);
        debug!(state = %self.result.state, on_face = self.result.face.is_some(), "point classified");
    }

    /// The solid points are classified against.
    pub fn solid(&self) -> Solid {
        self.solid
    }

    /// The current state.
    pub fn state(&self) -> TopoState {
        self.result.state
    }

    /// Inside the solid.
    pub fn is_in(&self) -> bool {
        self.result.state == TopoState::In
    }

    /// Outside the solid.
    pub fn is_out(&self) -> bool {
        self.result.state == TopoState::Out
    }

    /// On the boundary, within tolerance.
    pub fn is_on(&self) -> bool {
        self.result.state == TopoState::On
    }

    /// Not classified, or the kernel could not decide.
    pub fn is_unknown(&self) -> bool {
        self.result.state == TopoState::Unknown
    }

    /// On the boundary, and the face was resolved.
    pub fn is_on_face(&self) -> bool {
        self.is_on() && self.result.face.is_some()
    }

    /// The face the point lies on, when [`is_on_face`](Self::is_on_face).
    pub fn face(&self) -> Option<Face> {
        if self.is_on() {
            self.result.face
        } else {
            None
        }
    }
}

/// The point to classify: a point as-is, or a vertex's location.
fn location<K: GeometryKernel + ?Sized>(
    kernel: &K,
    entity: &Entity,
) -> Result<Point3, ConversionError> {
    if let Entity::Point(p) = entity {
        return Ok(*p);
    }
    entity
        .resolve(kernel)
        .filter(|(_, kind)| *kind == ShapeType::Vertex)
        .and_then(|(shape, _)| kernel.vertex_point(&Vertex::from_shape_unchecked(shape)))
        .ok_or_else(|| ConversionError::new(ShapeType::Vertex, entity.observed(kernel)))
}
