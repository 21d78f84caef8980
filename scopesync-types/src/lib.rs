//! Core type definitions for scopesync.
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`ObjectId`]: stable identifier of a mirrored object
//! - [`Value`]: a property value (primitive, reference, or flat list)
//! - [`Create`], [`Update`], [`Delete`] and the [`Changes`] batch
//! - [`Snapshot`]: a full dump of a scope
//!
//! The [`codec`] module reads and writes these types as JSON.

pub mod codec;
mod change;
mod ids;
mod snapshot;
mod value;

pub use change::{Change, Changes, Create, Delete, Update};
pub use ids::ObjectId;
pub use snapshot::{ObjectState, Snapshot};
pub use value::Value;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing wire data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Syntax error or schema violation in the JSON input.
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    MalformedJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Error::Io(err.into());
        }
        Error::MalformedJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}
