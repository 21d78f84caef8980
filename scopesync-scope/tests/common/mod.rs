#![allow(dead_code)]

use scopesync_model::{TypeDescriptor, TypeRegistry};
use scopesync_scope::{Scope, ScopeEvent, ScopeListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Types used across the scope tests: a plain `NodeA`, a `Foo`, and an
/// `Item` with a transient `tag`.
pub fn registry() -> TypeRegistry {
    [
        TypeDescriptor::new("NodeA"),
        TypeDescriptor::new("Foo"),
        TypeDescriptor::new("Item").with_transient("tag"),
    ]
    .into_iter()
    .collect()
}

pub fn scope() -> Scope {
    Scope::new(registry())
}

/// Records every event it receives.
#[derive(Default)]
pub struct Recorder {
    pub events: RefCell<Vec<ScopeEvent>>,
}

impl Recorder {
    pub fn attach(scope: &Scope) -> Rc<Recorder> {
        let recorder = Rc::new(Recorder::default());
        scope.listeners().add(recorder.clone());
        recorder
    }

    pub fn take(&self) -> Vec<ScopeEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

impl ScopeListener for Recorder {
    fn on_event(&self, _scope: &Scope, event: &ScopeEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
