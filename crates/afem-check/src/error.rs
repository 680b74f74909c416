//! Error types for the shape-checking layer.

use std::fmt;

use afem_kernel::KernelError;
use afem_topo::ShapeType;
use thiserror::Error;

/// What an input turned out to be when a conversion was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// No value, or a null shape handle.
    Null,
    /// A stored shape of this kind.
    Shape(ShapeType),
    /// A shape handle the kernel does not know, or whose tag disagrees
    /// with the stored kind.
    UnknownShape,
    /// A point-like value.
    Point,
    /// A curve-like value.
    Curve,
    /// A surface-like value.
    Surface,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Null => f.write_str("null"),
            EntityKind::Shape(kind) => write!(f, "{kind}"),
            EntityKind::UnknownShape => f.write_str("unknown shape"),
            EntityKind::Point => f.write_str("point"),
            EntityKind::Curve => f.write_str("curve"),
            EntityKind::Surface => f.write_str("surface"),
        }
    }
}

/// An input could not be turned into the requested shape kind.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert {observed} to {requested}")]
pub struct ConversionError {
    /// The kind the caller asked for.
    pub requested: ShapeType,
    /// What the input actually was.
    pub observed: EntityKind,
    /// The kernel failure, when a construction branch was taken and failed.
    #[source]
    pub cause: Option<KernelError>,
}

impl ConversionError {
    /// A conversion with no applicable rule.
    pub fn new(requested: ShapeType, observed: EntityKind) -> Self {
        Self {
            requested,
            observed,
            cause: None,
        }
    }
}

/// A real shape was required but the handle is null, not stored, or not
/// of the required kind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{operation} needs a stored shape, got a null or unknown handle")]
pub struct InvalidShapeError {
    /// The operation that rejected the handle.
    pub operation: &'static str,
}

/// Errors raised while loading or validating a [`CheckConfig`](crate::CheckConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML was malformed or had the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Any error raised by this crate.
#[derive(Error, Debug)]
pub enum CheckError {
    /// See [`ConversionError`].
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// See [`InvalidShapeError`].
    #[error(transparent)]
    InvalidShape(#[from] InvalidShapeError),

    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A kernel builder failed outside of a conversion.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for checking-layer operations.
pub type Result<T> = std::result::Result<T, CheckError>;
