use pretty_assertions::assert_eq;
use scopesync_model::diagram::props;
use scopesync_model::{diagram_registry, PartKind};
use scopesync_scope::graph::{
    add_edge, add_label, add_node, containing_graph, create_graph, label_owner, part_kind,
};
use scopesync_scope::{GraphListener, GraphListeners, Scope};
use scopesync_types::{Delete, ObjectId, ObjectState, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn diagram() -> Scope {
    Scope::new(diagram_registry())
}

/// Snapshot objects keyed by id; replicas may register objects in a
/// different order.
fn objects_by_id(scope: &Scope) -> Vec<ObjectState> {
    let mut objects = scope.write_snapshot().objects;
    objects.sort_by(|a, b| a.id.cmp(&b.id));
    objects
}

/// A graph with nodes `n1 -> n2`, a label on `n1` and one on the edge.
struct Fixture {
    scope: Scope,
    graph: ObjectId,
    n1: ObjectId,
    n2: ObjectId,
    edge: ObjectId,
    node_label: ObjectId,
    edge_label: ObjectId,
}

fn fixture() -> Fixture {
    let mut scope = diagram();
    let graph = create_graph(&mut scope).unwrap();
    let n1 = add_node(&mut scope, &graph).unwrap();
    let n2 = add_node(&mut scope, &graph).unwrap();
    let edge = add_edge(&mut scope, &graph, &n1, &n2).unwrap();
    let node_label = add_label(&mut scope, &n1, "start").unwrap();
    let edge_label = add_label(&mut scope, &edge, "flows").unwrap();
    Fixture {
        scope,
        graph,
        n1,
        n2,
        edge,
        node_label,
        edge_label,
    }
}

// ── Building ─────────────────────────────────────────────────────

#[test]
fn builders_link_parts() {
    let f = fixture();
    assert_eq!(part_kind(&f.scope, &f.graph), Some(PartKind::Graph));
    assert_eq!(part_kind(&f.scope, &f.edge), Some(PartKind::Edge));
    assert_eq!(
        f.scope.value(&f.graph, props::NODES),
        Some(&Value::List(vec![
            Value::Ref(f.n1.clone()),
            Value::Ref(f.n2.clone())
        ]))
    );
    assert_eq!(containing_graph(&f.scope, &f.n2), Some(f.graph.clone()));
    assert_eq!(containing_graph(&f.scope, &f.edge), Some(f.graph.clone()));
    assert_eq!(label_owner(&f.scope, &f.edge_label), Some(f.edge.clone()));
    assert_eq!(
        f.scope.value(&f.node_label, props::TEXT).and_then(Value::as_str),
        Some("start")
    );
}

#[test]
fn new_graph_pops_without_cycles() {
    let mut f = fixture();
    let changes = f.scope.pop_changes().unwrap();
    assert_eq!(changes.creates.len(), 6);

    let position = |id: &ObjectId| changes.creates.iter().position(|c| c.id == *id).unwrap();
    assert!(position(&f.n1) < position(&f.edge));
    assert!(position(&f.n2) < position(&f.edge));
    assert!(position(&f.edge) < position(&f.graph));
    assert!(position(&f.node_label) < position(&f.n1));
}

#[test]
fn replica_rebuilds_same_graph() {
    let mut f = fixture();
    let json = f.scope.pop_changes_to_string().unwrap();

    let mut replica = diagram();
    replica.update_from_str(&json).unwrap();
    assert_eq!(objects_by_id(&replica), objects_by_id(&f.scope));
    assert_eq!(containing_graph(&replica, &f.n1), Some(f.graph.clone()));
}

// ── Cascading deletes ────────────────────────────────────────────

#[test]
fn deleting_node_takes_labels_and_edges() {
    let mut f = fixture();
    f.scope.pop_changes().unwrap();

    f.scope.delete(&f.n1).unwrap();

    for gone in [&f.n1, &f.node_label, &f.edge, &f.edge_label] {
        assert!(!f.scope.contains(gone), "{gone} should be gone");
    }
    assert!(f.scope.contains(&f.n2));
    assert_eq!(
        f.scope.value(&f.graph, props::NODES),
        Some(&Value::List(vec![Value::Ref(f.n2.clone())]))
    );
    assert_eq!(
        f.scope.value(&f.graph, props::EDGES),
        Some(&Value::List(vec![]))
    );

    let changes = f.scope.pop_changes().unwrap();
    assert!(changes.creates.is_empty());
    assert!(changes.updates.is_empty());
    let mut deleted: Vec<_> = changes.deletes.iter().map(|d| d.id.clone()).collect();
    deleted.sort();
    let mut expected = vec![
        f.n1.clone(),
        f.node_label.clone(),
        f.edge.clone(),
        f.edge_label.clone(),
    ];
    expected.sort();
    assert_eq!(deleted, expected);
}

#[test]
fn deleting_graph_removes_everything() {
    let mut f = fixture();
    f.scope.delete(&f.graph).unwrap();
    assert!(f.scope.is_empty());
    assert!(f.scope.pop_changes().unwrap().is_empty());
}

#[test]
fn deleting_edge_leaves_nodes() {
    let mut f = fixture();
    f.scope.delete(&f.edge).unwrap();
    assert!(f.scope.contains(&f.n1));
    assert!(f.scope.contains(&f.n2));
    assert!(!f.scope.contains(&f.edge_label));
    assert!(f.scope.contains(&f.node_label));
}

#[test]
fn cascaded_batch_replays_on_replica() {
    let mut f = fixture();
    let mut replica = diagram();
    replica
        .update_from_str(&f.scope.pop_changes_to_string().unwrap())
        .unwrap();

    f.scope.delete(&f.n2).unwrap();
    let changes = f.scope.pop_changes().unwrap();
    assert!(changes.deletes.contains(&Delete::new(f.edge.clone())));

    replica.update(&changes).unwrap();
    assert_eq!(objects_by_id(&replica), objects_by_id(&f.scope));
}

// ── Graph listeners ──────────────────────────────────────────────

#[derive(Default)]
struct Log(RefCell<Vec<String>>);

impl GraphListener for Log {
    fn on_prepare(&self, _scope: &Scope) {
        self.0.borrow_mut().push("prepare".into());
    }

    fn on_created(&self, _scope: &Scope, kind: PartKind, id: &ObjectId) {
        self.0.borrow_mut().push(format!("created {kind:?} {id}"));
    }

    fn on_deleted(&self, scope: &Scope, kind: PartKind, id: &ObjectId) {
        let present = scope.contains(id);
        self.0
            .borrow_mut()
            .push(format!("deleted {kind:?} {id} present={present}"));
    }

    fn on_updated(&self, _scope: &Scope, kind: PartKind, id: &ObjectId, property: &str) {
        self.0
            .borrow_mut()
            .push(format!("updated {kind:?} {id} {property}"));
    }

    fn on_post_process(&self, _scope: &Scope) {
        self.0.borrow_mut().push("post".into());
    }
}

#[test]
fn events_are_classified_by_part_kind() {
    let mut scope = diagram();
    let listeners = GraphListeners::new();
    let log = Rc::new(Log::default());
    listeners.add(log.clone());
    listeners.install(&scope);

    let graph = create_graph(&mut scope).unwrap();
    let node = add_node(&mut scope, &graph).unwrap();
    scope.delete(&node).unwrap();

    assert_eq!(
        *log.0.borrow(),
        vec![
            "created Graph 1".to_string(),
            "created Node 2".to_string(),
            "updated Graph 1 nodes".to_string(),
            "deleted Node 2 present=true".to_string(),
        ]
    );
}

#[test]
fn remote_apply_brackets_part_events() {
    let mut source = diagram();
    let graph = create_graph(&mut source).unwrap();
    add_node(&mut source, &graph).unwrap();
    let json = source.pop_changes_to_string().unwrap();

    let mut replica = diagram();
    let listeners = GraphListeners::new();
    let log = Rc::new(Log::default());
    listeners.add(log.clone());
    listeners.install(&replica);
    replica.update_from_str(&json).unwrap();

    let log = log.0.borrow();
    assert_eq!(log.first().map(String::as_str), Some("prepare"));
    assert_eq!(log.last().map(String::as_str), Some("post"));
    assert!(log.contains(&"created Node 2".to_string()));
}

#[test]
fn non_diagram_objects_are_skipped() {
    let registry = [
        PartKind::Graph.descriptor(),
        scopesync_model::TypeDescriptor::new("Note"),
    ]
    .into_iter()
    .collect();
    let mut scope = Scope::new(registry);
    let listeners = GraphListeners::new();
    let log = Rc::new(Log::default());
    listeners.add(log.clone());
    listeners.install(&scope);

    scope.create("Note").unwrap();
    assert!(log.0.borrow().is_empty());
}
