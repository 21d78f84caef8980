//! Mirrored objects.

use indexmap::{IndexMap, IndexSet};
use scopesync_model::TypeDescriptor;
use scopesync_types::{ObjectId, Value};

/// Where an object stands relative to its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Built but not yet registered.
    Detached,
    /// Registered and addressable by id.
    Attached,
    /// Removed from its scope. Cannot be registered again.
    Deleted,
}

/// One mirrored object: a typed property bag plus the index of objects
/// currently referring to it.
///
/// Attached objects are owned by their [`Scope`](crate::Scope) and mutated
/// only through it, so that every write is tracked and announced.
#[derive(Debug, Clone)]
pub struct SharedObject {
    id: Option<ObjectId>,
    type_name: String,
    lifecycle: Lifecycle,
    properties: IndexMap<String, Value>,
    /// property name → objects whose value of that property refers to us.
    referrers: IndexMap<String, IndexSet<ObjectId>>,
}

impl SharedObject {
    /// Creates a detached object of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            lifecycle: Lifecycle::Detached,
            properties: IndexMap::new(),
            referrers: IndexMap::new(),
        }
    }

    /// Sets an initial property on a detached object. Null values are
    /// ignored.
    pub fn with_property(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.properties.insert(property.into(), value);
        }
        self
    }

    pub(crate) fn attached(id: ObjectId, type_name: impl Into<String>) -> Self {
        let mut object = Self::new(type_name);
        object.attach(id);
        object
    }

    /// The scope-assigned id. `None` for detached objects; deleted objects
    /// keep the id they had.
    pub fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle == Lifecycle::Attached
    }

    /// The stored value of `property`, `None` when unset.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    /// All set properties, in first-write order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The set, non-transient properties: what gets serialized.
    pub fn persistent_properties<'a>(
        &'a self,
        descriptor: Option<&'a TypeDescriptor>,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.properties()
            .filter(move |(name, _)| !descriptor.is_some_and(|d| d.is_transient(name)))
    }

    /// Objects currently referring to this one under `property`.
    pub fn referrers(&self, property: &str) -> impl Iterator<Item = &ObjectId> {
        self.referrers.get(property).into_iter().flatten()
    }

    /// Every `(property, referrer)` pair.
    pub fn all_referrers(&self) -> impl Iterator<Item = (&str, &ObjectId)> {
        self.referrers
            .iter()
            .flat_map(|(p, ids)| ids.iter().map(move |id| (p.as_str(), id)))
    }

    pub fn is_referenced(&self) -> bool {
        self.referrers.values().any(|ids| !ids.is_empty())
    }

    pub(crate) fn attach(&mut self, id: ObjectId) {
        self.id = Some(id);
        self.lifecycle = Lifecycle::Attached;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.lifecycle = Lifecycle::Deleted;
        self.referrers.clear();
    }

    /// Stores `value`, returning the previous one. Null unsets.
    pub(crate) fn put(&mut self, property: &str, value: Value) -> Option<Value> {
        if value.is_null() {
            self.properties.shift_remove(property)
        } else {
            self.properties.insert(property.to_string(), value)
        }
    }

    pub(crate) fn property_mut(&mut self, property: &str) -> Option<&mut Value> {
        self.properties.get_mut(property)
    }

    pub(crate) fn take_properties(&mut self) -> IndexMap<String, Value> {
        std::mem::take(&mut self.properties)
    }

    pub(crate) fn add_referrer(&mut self, property: &str, referrer: ObjectId) {
        self.referrers
            .entry(property.to_string())
            .or_default()
            .insert(referrer);
    }

    pub(crate) fn remove_referrer(&mut self, property: &str, referrer: &ObjectId) {
        if let Some(ids) = self.referrers.get_mut(property) {
            ids.shift_remove(referrer);
            if ids.is_empty() {
                self.referrers.shift_remove(property);
            }
        }
    }
}
