//! Error types for the sync layer.

use scopesync_scope::ScopeError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while shipping changes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local edit or remote apply rejected by the scope.
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Change-set (de)serialization failed.
    #[error(transparent)]
    Wire(#[from] scopesync_types::Error),

    /// The transport could not deliver a payload.
    #[error("transport error: {0}")]
    Transport(String),

    /// The other end of a channel went away.
    #[error("channel closed")]
    ChannelClosed,
}
