//! Debounced change shipping for a [`Scope`](scopesync_scope::Scope).
//!
//! A [`SyncSession`] owns a scope and a [`ChangeTransport`]. Local edits
//! go through [`SyncSession::mutate`], which (re)arms a trailing
//! [`FlushTimer`]; once edits have been quiet for
//! [`SyncConfig::flush_delay`] the pending diff is popped and sent as one
//! JSON change-set. Inbound change-sets are applied with
//! [`SyncSession::receive`].
//!
//! Scopes are single-threaded, so sessions run on a current-thread runtime
//! (or a `LocalSet`).

mod config;
mod debounce;
mod error;
mod session;
pub mod transport;

pub use config::SyncConfig;
pub use debounce::FlushTimer;
pub use error::{SyncError, SyncResult};
pub use session::{LocalEdit, SessionInput, SyncSession};
pub use transport::{ChangeTransport, ChannelTransport};
