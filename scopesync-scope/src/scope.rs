//! The scope: object registry and diff engine.

use crate::sorter::ChangeDependencySorter;
use crate::{
    Lifecycle, ListenerId, ScopeConfig, ScopeError, ScopeEvent, ScopeListener, ScopeListeners,
    ScopeResult, SharedObject,
};
use indexmap::{IndexMap, IndexSet};
use scopesync_model::TypeRegistry;
use scopesync_types::{codec, Change, Changes, Create, Delete, ObjectId, Update, Value};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, trace};

/// Pending per-object intent since the last [`Scope::pop_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
        }
    }
}

/// Registry of mirrored objects with local change tracking.
///
/// A scope is confined to one thread. Listeners are invoked synchronously
/// from the mutating call.
#[derive(Debug)]
pub struct Scope {
    registry: TypeRegistry,
    config: ScopeConfig,
    objects: IndexMap<ObjectId, SharedObject>,
    /// Creates and deletes since the last pop. A delete cancels a pending
    /// create of the same object.
    operations: IndexMap<ObjectId, Operation>,
    /// Changed properties of objects without a pending operation.
    changes: IndexMap<ObjectId, IndexSet<String>>,
    /// Highest id counter allocated or seen.
    id_source: u64,
    /// Set while a remote change-set is applied; suppresses tracking.
    replay: bool,
    /// Objects whose cascading delete is in progress.
    deleting: HashSet<ObjectId>,
    listeners: ScopeListeners,
}

impl Scope {
    /// Creates an empty scope allocating every id.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::build(registry, ScopeConfig::default())
    }

    /// Creates an empty scope with explicit id allocation settings.
    pub fn with_config(registry: TypeRegistry, config: ScopeConfig) -> ScopeResult<Self> {
        config.validate()?;
        Ok(Self::build(registry, config))
    }

    fn build(registry: TypeRegistry, config: ScopeConfig) -> Self {
        Self {
            registry,
            config,
            objects: IndexMap::new(),
            operations: IndexMap::new(),
            changes: IndexMap::new(),
            id_source: 0,
            replay: false,
            deleting: HashSet::new(),
            listeners: ScopeListeners::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> ScopeConfig {
        self.config
    }

    /// The listener list. Clone it to register listeners from inside a
    /// listener.
    pub fn listeners(&self) -> &ScopeListeners {
        &self.listeners
    }

    pub fn add_listener(&self, listener: impl ScopeListener + 'static) -> ListenerId {
        self.listeners.add(Rc::new(listener))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn get(&self, id: &ObjectId) -> Option<&SharedObject> {
        self.objects.get(id)
    }

    /// The stored value of one property, `None` when unset.
    pub fn value(&self, id: &ObjectId, property: &str) -> Option<&Value> {
        self.objects.get(id).and_then(|o| o.get(property))
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// All objects in registration order.
    pub fn objects(&self) -> impl Iterator<Item = &SharedObject> {
        self.objects.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The id high-water-mark: no id at or below it will be allocated.
    pub fn last_id(&self) -> u64 {
        self.id_source
    }

    pub fn is_replaying(&self) -> bool {
        self.replay
    }

    /// Whether [`Scope::pop_changes`] would return a non-empty batch.
    pub fn has_pending_changes(&self) -> bool {
        !self.operations.is_empty() || !self.changes.is_empty()
    }

    // ── Local mutation ───────────────────────────────────────────

    /// Creates and registers an empty object of the given type.
    pub fn create(&mut self, type_name: &str) -> ScopeResult<ObjectId> {
        self.insert(SharedObject::new(type_name))
    }

    /// Registers a detached object, assigning it the next id. Its initial
    /// properties become part of the pending create.
    pub fn insert(&mut self, mut object: SharedObject) -> ScopeResult<ObjectId> {
        match (object.lifecycle(), object.id()) {
            (Lifecycle::Attached, Some(id)) => return Err(ScopeError::AlreadyScoped(id.clone())),
            (Lifecycle::Deleted, Some(id)) => return Err(ScopeError::RecreateDeleted(id.clone())),
            _ => {}
        }
        if !self.registry.contains(object.type_name()) {
            return Err(ScopeError::UnknownType(object.type_name().to_string()));
        }
        let properties = object.take_properties();
        for (property, value) in &properties {
            self.check_value(property, value)?;
        }

        let id = self.allocate_id()?;
        if let Some(operation) = self.operations.get(&id) {
            return Err(ScopeError::PendingOperation(id, operation.name()));
        }
        object.attach(id.clone());
        self.objects.insert(id.clone(), object);
        for (property, value) in properties {
            self.write_raw(&id, &property, value);
        }
        self.notify_create(&id);
        Ok(id)
    }

    /// Writes a property. Writing `Null` unsets it. Returns the previous
    /// value.
    ///
    /// Transient properties are stored without being tracked or announced.
    pub fn set(
        &mut self,
        id: &ObjectId,
        property: &str,
        value: impl Into<Value>,
    ) -> ScopeResult<Option<Value>> {
        let value = value.into();
        let transient = {
            let object = self
                .objects
                .get(id)
                .ok_or_else(|| ScopeError::NotInScope(id.clone()))?;
            self.registry.is_transient(object.type_name(), property)
        };
        self.check_value(property, &value)?;
        if !transient {
            self.notify_update(id, property);
        }
        Ok(self.write_raw(id, property, value))
    }

    /// Deletes an object.
    ///
    /// Listeners are notified first, while the object is still visible.
    /// Then objects it owns or that depend on it are deleted, remaining
    /// references to it are cleared, and it is removed from the scope.
    pub fn delete(&mut self, id: &ObjectId) -> ScopeResult<SharedObject> {
        if !self.objects.contains_key(id) {
            return Err(ScopeError::NotInScope(id.clone()));
        }
        self.notify_delete(id);
        self.remove_object(id, true)
    }

    // ── Diffs ────────────────────────────────────────────────────

    /// Drains the pending local changes into a dependency-ordered batch.
    ///
    /// A pending create yields the create plus an update carrying the full
    /// persistent state; a pending delete yields a delete; other touched
    /// objects yield an update with just the changed properties (an unset
    /// property is sent as `null`).
    pub fn pop_changes(&mut self) -> ScopeResult<Changes> {
        let batch = self.pending_batch();
        if batch.is_empty() {
            return Ok(batch);
        }

        // Pending state is only cleared once the batch is known to be
        // sendable; a cycle leaves every edit in place.
        let sorted: Changes = ChangeDependencySorter::new(&batch).sort()?.into_iter().collect();
        self.operations.clear();
        self.changes.clear();
        debug!(
            creates = sorted.creates.len(),
            updates = sorted.updates.len(),
            deletes = sorted.deletes.len(),
            "popped local changes"
        );
        Ok(sorted)
    }

    /// The unsorted batch for the current pending state.
    fn pending_batch(&self) -> Changes {
        let mut batch = Changes::new();
        for (id, operation) in &self.operations {
            match operation {
                Operation::Create => {
                    let Some(object) = self.objects.get(id) else {
                        continue;
                    };
                    let descriptor = self.registry.get(object.type_name());
                    let values = object
                        .persistent_properties(descriptor)
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect();
                    batch.creates.push(Create::new(id.clone(), object.type_name()));
                    batch.updates.push(Update {
                        id: id.clone(),
                        values,
                    });
                }
                Operation::Delete => batch.deletes.push(Delete::new(id.clone())),
            }
        }
        for (id, properties) in &self.changes {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            let values = properties
                .iter()
                .map(|name| {
                    let value = object.get(name).cloned().unwrap_or_default();
                    (name.clone(), value)
                })
                .collect();
            batch.updates.push(Update {
                id: id.clone(),
                values,
            });
        }
        batch
    }

    /// [`Scope::pop_changes`], serialized as JSON.
    pub fn pop_changes_to_string(&mut self) -> ScopeResult<String> {
        let changes = self.pop_changes()?;
        Ok(codec::changes_to_string(&changes)?)
    }

    /// Applies a change-set received from another replica.
    ///
    /// The batch is applied in dependency order without being tracked as
    /// local changes. Listeners get `Prepare`, the `Delete`s (before
    /// anything is removed), then the `Create`s and `Update`s (after
    /// everything is applied), then `PostProcess`.
    pub fn update(&mut self, changes: &Changes) -> ScopeResult<()> {
        if self.replay {
            return Err(ScopeError::ReplayActive);
        }
        let order = ChangeDependencySorter::new(changes).sort()?;
        if let Some(missing) = changes.deletes.iter().find(|d| !self.contains(&d.id)) {
            return Err(ScopeError::UnresolvableId(missing.id.clone()));
        }

        self.fire(ScopeEvent::Prepare);
        for delete in &changes.deletes {
            self.fire(ScopeEvent::Delete(delete.id.clone()));
        }

        self.replay = true;
        let applied = order
            .into_iter()
            .try_for_each(|change| self.replay_change(change));
        self.replay = false;
        applied?;

        for create in &changes.creates {
            self.fire(ScopeEvent::Create(create.id.clone()));
        }
        for update in &changes.updates {
            for property in update.values.keys() {
                self.fire(ScopeEvent::Update {
                    id: update.id.clone(),
                    property: property.clone(),
                });
            }
        }
        self.fire(ScopeEvent::PostProcess);

        debug!(
            creates = changes.creates.len(),
            updates = changes.updates.len(),
            deletes = changes.deletes.len(),
            "applied remote changes"
        );
        Ok(())
    }

    /// Parses a JSON change-set and applies it with [`Scope::update`].
    pub fn update_from_str(&mut self, json: &str) -> ScopeResult<()> {
        let changes = codec::changes_from_str(json)?;
        self.update(&changes)
    }

    fn replay_change(&mut self, change: Change) -> ScopeResult<()> {
        match change {
            Change::Create(Create { id, type_name }) => {
                trace!(%id, %type_name, "replaying create");
                self.insert_stub(id, type_name)
            }
            Change::Update(Update { id, values }) => {
                if !self.contains(&id) {
                    return Err(ScopeError::UnresolvableId(id));
                }
                for (property, value) in values {
                    self.check_value(&property, &value)?;
                    self.forget_change(&id, &property);
                    self.write_raw(&id, &property, value);
                }
                Ok(())
            }
            Change::Delete(Delete { id }) => {
                trace!(%id, "replaying delete");
                self.operations.shift_remove(&id);
                self.changes.shift_remove(&id);
                self.remove_object(&id, false).map(drop)
            }
        }
    }

    // ── Internals shared with snapshot loading ───────────────────

    /// Registers an empty object under an id chosen elsewhere, advancing the
    /// id high-water-mark. Not tracked.
    pub(crate) fn insert_stub(&mut self, id: ObjectId, type_name: String) -> ScopeResult<()> {
        if self.objects.contains_key(&id) {
            return Err(ScopeError::IdCollision(id));
        }
        if !self.registry.contains(&type_name) {
            return Err(ScopeError::UnknownType(type_name));
        }
        if let Some(counter) = id.counter() {
            self.bump_id_source(counter);
        }
        self.objects
            .insert(id.clone(), SharedObject::attached(id, type_name));
        Ok(())
    }

    pub(crate) fn bump_id_source(&mut self, counter: u64) {
        self.id_source = self.id_source.max(counter);
    }

    /// Rejects nested lists, non-finite floats and references to unknown
    /// objects.
    pub(crate) fn check_value(&self, property: &str, value: &Value) -> ScopeResult<()> {
        if value.is_nested_list() {
            return Err(ScopeError::NestedList(property.to_string()));
        }
        if !value.is_finite() {
            return Err(ScopeError::NonFiniteFloat(property.to_string()));
        }
        match value.references().find(|r| !self.objects.contains_key(*r)) {
            Some(missing) => Err(ScopeError::UnresolvableId(missing.clone())),
            None => Ok(()),
        }
    }

    /// Stores a value and keeps the referrer index in step. No tracking, no
    /// events.
    pub(crate) fn write_raw(&mut self, id: &ObjectId, property: &str, value: Value) -> Option<Value> {
        let added: Vec<ObjectId> = value.references().cloned().collect();
        let old = self.objects.get_mut(id)?.put(property, value);
        if let Some(old) = &old {
            for target in old.references() {
                if let Some(target) = self.objects.get_mut(target) {
                    target.remove_referrer(property, id);
                }
            }
        }
        for target in added {
            if let Some(target) = self.objects.get_mut(&target) {
                target.add_referrer(property, id.clone());
            }
        }
        old
    }

    pub(crate) fn fire(&self, event: ScopeEvent) {
        self.listeners.dispatch(self, &event);
    }

    // ── Tracking ─────────────────────────────────────────────────

    /// Next free id in this replica's stride. Ids already registered (for
    /// instance under a string id that parses as a counter) are skipped.
    fn allocate_id(&mut self) -> ScopeResult<ObjectId> {
        loop {
            self.id_source = self
                .id_source
                .checked_add(1)
                .ok_or(ScopeError::IdSpaceExhausted)?;
            if !self.config.owns(self.id_source) {
                continue;
            }
            let id = ObjectId::from_counter(self.id_source);
            if !self.objects.contains_key(&id) {
                return Ok(id);
            }
        }
    }

    fn notify_create(&mut self, id: &ObjectId) {
        if !self.replay {
            self.operations.insert(id.clone(), Operation::Create);
        }
        debug!(%id, "object created");
        self.fire(ScopeEvent::Create(id.clone()));
    }

    fn notify_update(&mut self, id: &ObjectId, property: &str) {
        // A pending create serializes the full state anyway.
        if !self.replay && !self.operations.contains_key(id) {
            self.changes
                .entry(id.clone())
                .or_default()
                .insert(property.to_string());
        }
        self.fire(ScopeEvent::Update {
            id: id.clone(),
            property: property.to_string(),
        });
    }

    /// Drops a pending local change that a remote write superseded.
    fn forget_change(&mut self, id: &ObjectId, property: &str) {
        if let Some(properties) = self.changes.get_mut(id) {
            properties.shift_remove(property);
            if properties.is_empty() {
                self.changes.shift_remove(id);
            }
        }
    }

    fn notify_delete(&mut self, id: &ObjectId) {
        if !self.replay {
            if self.operations.get(id) == Some(&Operation::Create) {
                self.operations.shift_remove(id);
            } else {
                self.operations.insert(id.clone(), Operation::Delete);
            }
            self.changes.shift_remove(id);
        }
        debug!(%id, "object deleted");
        self.fire(ScopeEvent::Delete(id.clone()));
    }

    // ── Removal ──────────────────────────────────────────────────

    fn remove_object(&mut self, id: &ObjectId, cascade: bool) -> ScopeResult<SharedObject> {
        if cascade {
            self.deleting.insert(id.clone());
            let cascaded = self.delete_dependents(id);
            self.deleting.remove(id);
            cascaded?;
        }

        let mut object = self
            .objects
            .shift_remove(id)
            .ok_or_else(|| ScopeError::NotInScope(id.clone()))?;

        for (property, referrer_id) in object.all_referrers() {
            let Some(referrer) = self.objects.get_mut(referrer_id) else {
                continue;
            };
            let emptied = match referrer.property_mut(property) {
                Some(value) => {
                    value.remove_reference(id);
                    value.is_null()
                }
                None => false,
            };
            if emptied {
                referrer.put(property, Value::Null);
            }
        }
        for (property, value) in object.properties() {
            for target in value.references() {
                if let Some(target) = self.objects.get_mut(target) {
                    target.remove_referrer(property, id);
                }
            }
        }

        object.mark_deleted();
        Ok(object)
    }

    /// Deletes what `id` owns and what depends on it, per its type.
    fn delete_dependents(&mut self, id: &ObjectId) -> ScopeResult<()> {
        let Some(object) = self.objects.get(id) else {
            return Ok(());
        };
        let Some(descriptor) = self.registry.get(object.type_name()) else {
            return Ok(());
        };

        let mut doomed: IndexSet<ObjectId> = IndexSet::new();
        for property in &descriptor.owned {
            if let Some(value) = object.get(property) {
                doomed.extend(value.references().cloned());
            }
        }
        for property in &descriptor.dependents {
            doomed.extend(object.referrers(property).cloned());
        }

        for other in doomed {
            if self.objects.contains_key(&other) && !self.deleting.contains(&other) {
                trace!(%id, dependent = %other, "cascading delete");
                self.delete(&other)?;
            }
        }
        Ok(())
    }
}
