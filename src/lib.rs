pub mod attributes;
pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use attributes::{Attributes, DefaultTraits, MeshTraits, PositionTraits};
pub use error::{AttributeError, KernelError, Result, TopologyError};
pub use topology::Mesh;
