//! Full scope snapshots.

use crate::{ObjectId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Every object of a scope, in registration order.
///
/// Serialized as `{"objects": [...], "last-id": n}`; `last-id` is the
/// writer's id high-water-mark and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub objects: Vec<ObjectState>,
    #[serde(default, rename = "last-id", skip_serializing_if = "Option::is_none")]
    pub last_id: Option<u64>,
}

/// The persistent state of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectState {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

impl ObjectState {
    pub fn new(id: impl Into<ObjectId>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }
}
