//! Dependency ordering for change-sets.
//!
//! Applying an update that references object `B` requires `B` to exist.
//! [`ChangeDependencySorter`] orders a batch so that creates (each followed
//! by its initial values) come before the objects referring to them,
//! standalone updates follow in dependency order, and deletes come last.

use indexmap::{IndexMap, IndexSet};
use scopesync_types::{Change, Changes, ObjectId, Update};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// A dependency cycle. The first element is repeated at the end, so the
/// cycle reads as a closed loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cyclic dependency: {}", render_cycle(.cycle))]
pub struct CyclicDependency<T: fmt::Debug + fmt::Display> {
    cycle: Vec<T>,
}

impl<T: fmt::Debug + fmt::Display> CyclicDependency<T> {
    pub fn cycle(&self) -> &[T] {
        &self.cycle
    }

    pub fn into_cycle(self) -> Vec<T> {
        self.cycle
    }
}

fn render_cycle<T: fmt::Display>(cycle: &[T]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Sorts `nodes` so that every node comes after the nodes it depends on.
///
/// `dependencies` must only yield members of `nodes`. Nodes without mutual
/// dependencies keep their input order. Fails on the first cycle found.
pub fn topsort<T, I, F, D>(nodes: I, mut dependencies: F) -> Result<Vec<T>, CyclicDependency<T>>
where
    T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> D,
    D: IntoIterator<Item = T>,
{
    let mut sort = TopSort {
        seen: IndexSet::new(),
        pending: IndexSet::new(),
    };
    for node in nodes {
        sort.visit(node, &mut dependencies)?;
    }
    Ok(sort.seen.into_iter().collect())
}

struct TopSort<T> {
    /// Fully processed nodes, in output order.
    seen: IndexSet<T>,
    /// The current DFS path.
    pending: IndexSet<T>,
}

impl<T> TopSort<T>
where
    T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
{
    fn visit<F, D>(&mut self, node: T, dependencies: &mut F) -> Result<(), CyclicDependency<T>>
    where
        F: FnMut(&T) -> D,
        D: IntoIterator<Item = T>,
    {
        if self.seen.contains(&node) {
            return Ok(());
        }
        if let Some(start) = self.pending.get_index_of(&node) {
            let mut cycle: Vec<T> = self.pending.iter().skip(start).cloned().collect();
            cycle.push(node);
            return Err(CyclicDependency { cycle });
        }

        self.pending.insert(node.clone());
        for dependency in dependencies(&node) {
            self.visit(dependency, dependencies)?;
        }
        self.pending.pop();
        self.seen.insert(node);
        Ok(())
    }
}

/// Computes a dependency-respecting application order for a change-set.
pub struct ChangeDependencySorter<'a> {
    changes: &'a Changes,
}

impl<'a> ChangeDependencySorter<'a> {
    pub fn new(changes: &'a Changes) -> Self {
        Self { changes }
    }

    /// Orders the batch: sorted creates, each immediately followed by its
    /// updates; then sorted standalone updates; then deletes as given.
    pub fn sort(&self) -> Result<Vec<Change>, CyclicDependency<ObjectId>> {
        let creates_by_id: IndexMap<&ObjectId, _> =
            self.changes.creates.iter().map(|c| (&c.id, c)).collect();

        let mut updates_by_id: IndexMap<&ObjectId, Vec<&Update>> = IndexMap::new();
        for update in &self.changes.updates {
            updates_by_id.entry(&update.id).or_default().push(update);
        }

        let references = |id: &ObjectId| -> Vec<ObjectId> {
            let mut refs: IndexSet<ObjectId> = IndexSet::new();
            for update in updates_by_id.get(id).into_iter().flatten() {
                refs.extend(update.references().filter(|r| *r != id).cloned());
            }
            refs.into_iter().collect()
        };

        let create_order = topsort(creates_by_id.keys().map(|id| (*id).clone()), |id| {
            references(id)
                .into_iter()
                .filter(|r| creates_by_id.contains_key(r))
                .collect::<Vec<_>>()
        })?;

        let standalone: IndexSet<&ObjectId> = updates_by_id
            .keys()
            .filter(|id| !creates_by_id.contains_key(*id))
            .copied()
            .collect();
        let update_order = topsort(standalone.iter().map(|id| (*id).clone()), |id| {
            references(id)
                .into_iter()
                .filter(|r| standalone.contains(r))
                .collect::<Vec<_>>()
        })?;

        let mut sorted = Vec::with_capacity(self.changes.len());
        for id in &create_order {
            sorted.push(Change::Create(creates_by_id[id].clone()));
            for update in updates_by_id.get(id).into_iter().flatten() {
                sorted.push(Change::Update((*update).clone()));
            }
        }
        for id in &update_order {
            for update in &updates_by_id[id] {
                sorted.push(Change::Update((*update).clone()));
            }
        }
        sorted.extend(self.changes.deletes.iter().cloned().map(Change::Delete));
        Ok(sorted)
    }
}
