//! Object type model for scopesync.
//!
//! Defines the per-scope type information the diff engine consults:
//! - [`TypeDescriptor`]: which properties are transient, owned, or dependent
//! - [`TypeRegistry`]: the set of types one scope may instantiate
//! - [`PartKind`]: the closed set of diagram part kinds and their preset
//!   descriptors, see [`diagram_registry`]
//!
//! A registry is an explicit value handed to each scope. There is no global
//! type table.

mod descriptor;
pub mod diagram;
mod registry;

pub use descriptor::TypeDescriptor;
pub use diagram::{diagram_registry, PartKind};
pub use registry::TypeRegistry;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or querying a registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown object type: {0}")]
    UnknownType(String),

    #[error("object type registered twice: {0}")]
    DuplicateType(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
