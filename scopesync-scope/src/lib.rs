//! Client-side mirror of a shared object graph.
//!
//! A [`Scope`] owns every mirrored object, keyed by [`ObjectId`]. Local
//! mutations are tracked and drained as minimal diffs with
//! [`Scope::pop_changes`]; diffs from other replicas are applied with
//! [`Scope::update`]. Full dumps go through [`Scope::write_snapshot`] and
//! [`Scope::read_snapshot`].
//!
//! # Components
//!
//! - **Objects**: [`SharedObject`] holds properties and a referrer index
//!   (who points at me, under which property).
//! - **Sorting**: [`ChangeDependencySorter`] orders a batch so that every
//!   referenced object is created before its referrers; [`topsort`] is the
//!   underlying DFS with cycle detection.
//! - **Events**: [`ScopeListeners`] fans out [`ScopeEvent`]s;
//!   [`GraphListeners`] re-dispatches them per diagram [`PartKind`].
//!
//! # Example
//!
//! ```
//! use scopesync_model::{TypeDescriptor, TypeRegistry};
//! use scopesync_scope::Scope;
//!
//! let registry: TypeRegistry = [TypeDescriptor::new("NodeA")].into_iter().collect();
//! let mut scope = Scope::new(registry);
//!
//! let id = scope.create("NodeA").unwrap();
//! scope.set(&id, "name", "foo").unwrap();
//!
//! let changes = scope.pop_changes().unwrap();
//! assert_eq!(changes.creates.len(), 1);
//! assert!(scope.pop_changes().unwrap().is_empty());
//! ```
//!
//! [`ObjectId`]: scopesync_types::ObjectId
//! [`PartKind`]: scopesync_model::PartKind

mod config;
mod error;
mod event;
pub mod graph;
mod listener;
mod object;
mod scope;
mod snapshot;
pub mod sorter;

pub use config::ScopeConfig;
pub use error::{ScopeError, ScopeResult};
pub use event::{EventKind, ScopeEvent};
pub use graph::{GraphListener, GraphListeners};
pub use listener::{ListenerId, ScopeListener, ScopeListeners};
pub use object::{Lifecycle, SharedObject};
pub use scope::Scope;
pub use sorter::{topsort, ChangeDependencySorter, CyclicDependency};
