//! Listener registry with re-entrancy safe dispatch.
//!
//! Dispatch iterates a snapshot of the listener list taken when the event
//! is fired. A listener may add or remove listeners (through a cloned
//! [`ScopeListeners`] handle) while being invoked; the change takes effect
//! with the next event.

use crate::{Scope, ScopeEvent};
use std::cell::RefCell;
use std::rc::Rc;

/// Receives scope events.
///
/// Listeners see the scope read-only. Interior mutability is the listener's
/// own business.
pub trait ScopeListener {
    fn on_event(&self, scope: &Scope, event: &ScopeEvent);
}

impl<F> ScopeListener for F
where
    F: Fn(&Scope, &ScopeEvent),
{
    fn on_event(&self, scope: &Scope, event: &ScopeEvent) {
        self(scope, event)
    }
}

/// Handle returned by [`ScopeListeners::add`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<dyn ScopeListener>)>,
}

/// Shared, cloneable list of scope listeners.
#[derive(Clone, Default)]
pub struct ScopeListeners {
    inner: Rc<RefCell<Registry>>,
}

impl ScopeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Rc<dyn ScopeListener>) -> ListenerId {
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, listener));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|(entry, _)| *entry != id);
        registry.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every listener registered at call time.
    pub fn dispatch(&self, scope: &Scope, event: &ScopeEvent) {
        let snapshot: Vec<Rc<dyn ScopeListener>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.on_event(scope, event);
        }
    }
}

impl std::fmt::Debug for ScopeListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeListeners")
            .field("len", &self.len())
            .finish()
    }
}
