//! Diagram scopes.
//!
//! Helpers to build graphs out of [`PartKind`] objects, and a listener
//! multiplexer that re-dispatches scope events per part kind (the hook a
//! renderer attaches to).

use crate::{ListenerId, Scope, ScopeEvent, ScopeListener, ScopeResult};
use scopesync_model::diagram::props;
use scopesync_model::PartKind;
use scopesync_types::{ObjectId, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Creates an empty graph.
pub fn create_graph(scope: &mut Scope) -> ScopeResult<ObjectId> {
    scope.create(PartKind::Graph.type_name())
}

/// Creates a node inside `graph`.
pub fn add_node(scope: &mut Scope, graph: &ObjectId) -> ScopeResult<ObjectId> {
    let node = scope.create(PartKind::Node.type_name())?;
    append(scope, graph, props::NODES, &node)?;
    Ok(node)
}

/// Creates an edge from `source` to `target` inside `graph`.
pub fn add_edge(
    scope: &mut Scope,
    graph: &ObjectId,
    source: &ObjectId,
    target: &ObjectId,
) -> ScopeResult<ObjectId> {
    let edge = scope.create(PartKind::Edge.type_name())?;
    scope.set(&edge, props::SOURCE, source.clone())?;
    scope.set(&edge, props::TARGET, target.clone())?;
    append(scope, graph, props::EDGES, &edge)?;
    Ok(edge)
}

/// Attaches a text label to a node or edge.
pub fn add_label(scope: &mut Scope, owner: &ObjectId, text: &str) -> ScopeResult<ObjectId> {
    let label = scope.create(PartKind::Label.type_name())?;
    scope.set(&label, props::TEXT, text)?;
    append(scope, owner, props::LABELS, &label)?;
    Ok(label)
}

/// The part kind of an object, if it is a diagram part.
pub fn part_kind(scope: &Scope, id: &ObjectId) -> Option<PartKind> {
    scope
        .get(id)
        .and_then(|object| PartKind::from_type_name(object.type_name()))
}

/// The graph listing a node or edge.
pub fn containing_graph(scope: &Scope, part: &ObjectId) -> Option<ObjectId> {
    let object = scope.get(part)?;
    object
        .referrers(props::NODES)
        .chain(object.referrers(props::EDGES))
        .next()
        .cloned()
}

/// The node or edge listing a label.
pub fn label_owner(scope: &Scope, label: &ObjectId) -> Option<ObjectId> {
    scope.get(label)?.referrers(props::LABELS).next().cloned()
}

fn append(scope: &mut Scope, id: &ObjectId, property: &str, item: &ObjectId) -> ScopeResult<()> {
    let mut items = scope
        .value(id, property)
        .and_then(Value::as_list)
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    items.push(Value::Ref(item.clone()));
    scope.set(id, property, items)?;
    Ok(())
}

/// Receives scope events for diagram parts, already classified by kind.
pub trait GraphListener {
    fn on_prepare(&self, _scope: &Scope) {}

    fn on_created(&self, _scope: &Scope, _kind: PartKind, _id: &ObjectId) {}

    /// Called while the part is still present.
    fn on_deleted(&self, _scope: &Scope, _kind: PartKind, _id: &ObjectId) {}

    fn on_updated(&self, _scope: &Scope, _kind: PartKind, _id: &ObjectId, _property: &str) {}

    fn on_post_process(&self, _scope: &Scope) {}
}

/// Fans scope events out to [`GraphListener`]s. Events about objects that
/// are not diagram parts are dropped.
///
/// Like [`ScopeListeners`](crate::ScopeListeners), dispatch iterates a
/// snapshot, so listeners added during dispatch see the next event.
#[derive(Clone, Default)]
pub struct GraphListeners {
    listeners: Rc<RefCell<Vec<Rc<dyn GraphListener>>>>,
}

impl GraphListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Rc<dyn GraphListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers this multiplexer with `scope`.
    pub fn install(&self, scope: &Scope) -> ListenerId {
        scope.add_listener(self.clone())
    }
}

impl ScopeListener for GraphListeners {
    fn on_event(&self, scope: &Scope, event: &ScopeEvent) {
        let listeners = self.listeners.borrow().clone();
        match event {
            ScopeEvent::Prepare => listeners.iter().for_each(|l| l.on_prepare(scope)),
            ScopeEvent::PostProcess => listeners.iter().for_each(|l| l.on_post_process(scope)),
            ScopeEvent::Create(id) | ScopeEvent::Delete(id) | ScopeEvent::Update { id, .. } => {
                let Some(kind) = part_kind(scope, id) else {
                    trace!(%id, "ignoring event for non-diagram object");
                    return;
                };
                for listener in &listeners {
                    match event {
                        ScopeEvent::Create(_) => listener.on_created(scope, kind, id),
                        ScopeEvent::Delete(_) => listener.on_deleted(scope, kind, id),
                        ScopeEvent::Update { property, .. } => {
                            listener.on_updated(scope, kind, id, property)
                        }
                        ScopeEvent::Prepare | ScopeEvent::PostProcess => {}
                    }
                }
            }
        }
    }
}
