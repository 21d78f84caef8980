use crate::{Error, Result, TypeDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io;

/// The object types a scope can instantiate, keyed by type name.
///
/// Serialized as `{"types": [descriptor, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. Fails if the name is already taken.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        if self.types.contains_key(&descriptor.type_name) {
            return Err(Error::DuplicateType(descriptor.type_name));
        }
        self.types.insert(descriptor.type_name.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Like [`TypeRegistry::get`], failing for unknown names.
    pub fn descriptor(&self, type_name: &str) -> Result<&TypeDescriptor> {
        self.get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Whether `property` of `type_name` is transient. Unknown types have no
    /// transient properties.
    pub fn is_transient(&self, type_name: &str, property: &str) -> bool {
        self.get(type_name).is_some_and(|d| d.is_transient(property))
    }

    /// Loads a registry from JSON.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Collects descriptors; a later descriptor replaces an earlier one with the
/// same type name.
impl FromIterator<TypeDescriptor> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let types = iter
            .into_iter()
            .map(|d| (d.type_name.clone(), d))
            .collect();
        Self { types }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryRepr<T> {
    types: Vec<T>,
}

impl Serialize for TypeRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RegistryRepr {
            types: self.types.values().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypeRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = RegistryRepr::<TypeDescriptor>::deserialize(deserializer)?;
        let mut registry = TypeRegistry::new();
        for descriptor in repr.types {
            registry
                .register(descriptor)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(registry)
    }
}
