//! Property-based tests for replica convergence.
//!
//! Random local edit sequences are shipped to a second scope in batches;
//! after every batch both scopes must hold the same objects. References only
//! ever point at older objects, so batches never contain cycles.

mod common;

use proptest::prelude::*;
use scopesync_scope::Scope;
use scopesync_types::{ObjectId, ObjectState, Value};

#[derive(Debug, Clone)]
enum Op {
    Create,
    Set(usize, &'static str, i64),
    Link(usize, usize),
    Append(usize, usize),
    Unset(usize, &'static str),
    Delete(usize),
    Sync,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let property = prop::sample::select(vec!["name", "size", "peer", "items"]);
    prop_oneof![
        3 => Just(Op::Create),
        3 => (any::<usize>(), property.clone(), any::<i64>()).prop_map(|(i, p, v)| Op::Set(i, p, v)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::Link(i, j)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::Append(i, j)),
        1 => (any::<usize>(), property).prop_map(|(i, p)| Op::Unset(i, p)),
        1 => any::<usize>().prop_map(Op::Delete),
        2 => Just(Op::Sync),
    ]
}

fn pick(scope: &Scope, index: usize) -> Option<ObjectId> {
    let len = scope.len();
    if len == 0 {
        return None;
    }
    scope.ids().nth(index % len).cloned()
}

/// An (older, newer) pair of live objects, by id counter.
fn ordered_pair(scope: &Scope, i: usize, j: usize) -> Option<(ObjectId, ObjectId)> {
    let a = pick(scope, i)?;
    let b = pick(scope, j)?;
    match a.counter()?.cmp(&b.counter()?) {
        std::cmp::Ordering::Less => Some((a, b)),
        std::cmp::Ordering::Greater => Some((b, a)),
        std::cmp::Ordering::Equal => None,
    }
}

fn apply(scope: &mut Scope, op: &Op) {
    match *op {
        Op::Create => {
            scope.create("NodeA").unwrap();
        }
        Op::Set(i, property, value) => {
            if let Some(id) = pick(scope, i) {
                scope.set(&id, property, value).unwrap();
            }
        }
        Op::Link(i, j) => {
            if let Some((older, newer)) = ordered_pair(scope, i, j) {
                scope.set(&newer, "peer", older).unwrap();
            }
        }
        Op::Append(i, j) => {
            if let Some((older, newer)) = ordered_pair(scope, i, j) {
                let mut items = scope
                    .value(&newer, "items")
                    .and_then(Value::as_list)
                    .map(<[Value]>::to_vec)
                    .unwrap_or_default();
                items.push(Value::Ref(older));
                scope.set(&newer, "items", items).unwrap();
            }
        }
        Op::Unset(i, property) => {
            if let Some(id) = pick(scope, i) {
                scope.set(&id, property, Value::Null).unwrap();
            }
        }
        Op::Delete(i) => {
            if let Some(id) = pick(scope, i) {
                scope.delete(&id).unwrap();
            }
        }
        Op::Sync => {}
    }
}

fn objects_by_id(scope: &Scope) -> Vec<ObjectState> {
    let mut objects = scope.write_snapshot().objects;
    objects.sort_by(|a, b| a.id.cmp(&b.id));
    objects
}

proptest! {
    #[test]
    fn replica_converges_after_every_batch(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut local = common::scope();
        let mut replica = common::scope();

        for op in ops.iter().chain(std::iter::once(&Op::Sync)) {
            apply(&mut local, op);
            if let Op::Sync = op {
                let json = local.pop_changes_to_string().unwrap();
                replica.update_from_str(&json).unwrap();
                prop_assert_eq!(objects_by_id(&replica), objects_by_id(&local));
                prop_assert!(!replica.has_pending_changes());
            }
        }
    }

    #[test]
    fn diff_applies_on_top_of_snapshot(
        before in prop::collection::vec(op_strategy(), 0..30),
        after in prop::collection::vec(op_strategy(), 1..30),
    ) {
        let mut local = common::scope();
        for op in &before {
            apply(&mut local, op);
        }
        local.pop_changes().unwrap();

        let mut replica = common::scope();
        replica.read_snapshot(&local.write_snapshot()).unwrap();

        for op in &after {
            apply(&mut local, op);
        }
        replica.update_from_str(&local.pop_changes_to_string().unwrap()).unwrap();
        prop_assert_eq!(objects_by_id(&replica), objects_by_id(&local));
    }

    #[test]
    fn pop_changes_drains_everything(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut scope = common::scope();
        for op in &ops {
            apply(&mut scope, op);
        }
        scope.pop_changes().unwrap();
        prop_assert!(!scope.has_pending_changes());
        prop_assert!(scope.pop_changes().unwrap().is_empty());
    }

    #[test]
    fn snapshot_reload_is_lossless(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut scope = common::scope();
        for op in &ops {
            apply(&mut scope, op);
        }
        let snapshot = scope.write_snapshot();

        let mut copy = common::scope();
        copy.read_snapshot(&snapshot).unwrap();
        prop_assert_eq!(copy.write_snapshot(), snapshot);
        prop_assert_eq!(copy.last_id(), scope.last_id());
    }
}
