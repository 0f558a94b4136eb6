use thiserror::Error;

/// Top-level error type for the seamkit mesh kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Errors related to topological entities and their connectivity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity is deleted: {0}")]
    EntityDeleted(String),

    #[error("edge {from} -> {to} is already used by another face")]
    NonManifoldEdge { from: String, to: String },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors reported by attribute bundles during validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttributeError {
    #[error("normal is not unit length (length = {length})")]
    NormalNotUnit { length: f64 },

    #[error("tangent is not unit length (length = {length})")]
    TangentNotUnit { length: f64 },

    #[error("texture coordinate ({u}, {v}) is outside [0, 1]")]
    TexCoordOutOfRange { u: f64, v: f64 },

    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

/// Convenience type alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;
