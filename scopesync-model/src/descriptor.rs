use serde::{Deserialize, Serialize};

/// Describes how the scope treats the properties of one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    pub type_name: String,
    /// Properties excluded from change tracking and serialization
    /// (e.g. a renderer handle stored on the object).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transient: Vec<String>,
    /// Properties whose referenced objects are deleted together with the
    /// owner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned: Vec<String>,
    /// Properties through which other objects depend on this one: deleting
    /// this object deletes every object referring to it under one of these
    /// names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            transient: Vec::new(),
            owned: Vec::new(),
            dependents: Vec::new(),
        }
    }

    pub fn with_transient(mut self, property: impl Into<String>) -> Self {
        self.transient.push(property.into());
        self
    }

    pub fn with_owned(mut self, property: impl Into<String>) -> Self {
        self.owned.push(property.into());
        self
    }

    pub fn with_dependent(mut self, property: impl Into<String>) -> Self {
        self.dependents.push(property.into());
        self
    }

    pub fn is_transient(&self, property: &str) -> bool {
        self.transient.iter().any(|p| p == property)
    }

    pub fn is_owned(&self, property: &str) -> bool {
        self.owned.iter().any(|p| p == property)
    }

    pub fn is_dependent(&self, property: &str) -> bool {
        self.dependents.iter().any(|p| p == property)
    }
}
