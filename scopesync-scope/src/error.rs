//! Error types for scope operations.
//!
//! Every variant signals a desynchronized or misused scope. None of them is
//! recovered internally; callers typically discard the mirror and reload a
//! snapshot.

use crate::sorter::CyclicDependency;
use scopesync_types::ObjectId;
use thiserror::Error;

/// Result type for scope operations.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors that can occur in scope operations.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The object is already registered.
    #[error("object {0} is already registered in this scope")]
    AlreadyScoped(ObjectId),

    /// The object already has a create or delete recorded this round.
    #[error("object {0} already has a pending {1} operation")]
    PendingOperation(ObjectId, &'static str),

    /// Deleted objects cannot be registered again.
    #[error("re-creating deleted object {0} is not supported")]
    RecreateDeleted(ObjectId),

    /// The object is not (or no longer) part of this scope.
    #[error("object {0} is not part of this scope")]
    NotInScope(ObjectId),

    /// A reference names an object this scope does not contain.
    #[error("unresolvable object ID: {0}")]
    UnresolvableId(ObjectId),

    /// A remote create uses an id that is already taken locally.
    #[error("object ID {0} collides with an existing object")]
    IdCollision(ObjectId),

    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// A remote change-set is being applied already.
    #[error("already applying a remote change set")]
    ReplayActive,

    #[error("nested lists are not supported (property {0})")]
    NestedList(String),

    /// Floats must be finite to survive the JSON encoding.
    #[error("non-finite float in property {0}")]
    NonFiniteFloat(String),

    /// Every id in this replica's stride is taken.
    #[error("object ID space exhausted")]
    IdSpaceExhausted,

    #[error("invalid scope configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Cycle(#[from] CyclicDependency<ObjectId>),

    #[error(transparent)]
    Wire(#[from] scopesync_types::Error),
}
