//! Change records and change-set batches.
//!
//! A [`Changes`] batch is one atomic diff between two replicas of a scope:
//! objects to create, property values to write, and objects to delete.

use crate::{ObjectId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Instantiate an empty object of the named type under `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Create {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Create {
    pub fn new(id: impl Into<ObjectId>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
        }
    }
}

/// Write property values of an existing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Update {
    pub id: ObjectId,
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}

impl Update {
    pub fn new(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            values: IndexMap::new(),
        }
    }

    /// Adds a property value to the update.
    pub fn with_value(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    /// Iterates the ids referenced by any of the written values.
    pub fn references(&self) -> impl Iterator<Item = &ObjectId> {
        self.values.values().flat_map(|v| v.references())
    }
}

/// Remove an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delete {
    pub id: ObjectId,
}

impl Delete {
    pub fn new(id: impl Into<ObjectId>) -> Self {
        Self { id: id.into() }
    }
}

/// A single change, as produced by dependency sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Create(Create),
    Update(Update),
    Delete(Delete),
}

impl Change {
    /// The id of the object this change applies to.
    pub fn id(&self) -> &ObjectId {
        match self {
            Change::Create(c) => &c.id,
            Change::Update(u) => &u.id,
            Change::Delete(d) => &d.id,
        }
    }
}

impl From<Create> for Change {
    fn from(c: Create) -> Self {
        Change::Create(c)
    }
}

impl From<Update> for Change {
    fn from(u: Update) -> Self {
        Change::Update(u)
    }
}

impl From<Delete> for Change {
    fn from(d: Delete) -> Self {
        Change::Delete(d)
    }
}

/// A batch of changes, serialized as
/// `{"creates": [...], "updates": [...], "deletes": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Changes {
    #[serde(default)]
    pub creates: Vec<Create>,
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub deletes: Vec<Delete>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of records in the batch.
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    pub fn push(&mut self, change: impl Into<Change>) {
        match change.into() {
            Change::Create(c) => self.creates.push(c),
            Change::Update(u) => self.updates.push(u),
            Change::Delete(d) => self.deletes.push(d),
        }
    }

    /// Builder form of [`Changes::push`].
    pub fn with(mut self, change: impl Into<Change>) -> Self {
        self.push(change);
        self
    }
}

impl FromIterator<Change> for Changes {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        let mut changes = Changes::new();
        for change in iter {
            changes.push(change);
        }
        changes
    }
}
