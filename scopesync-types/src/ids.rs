//! Object identifiers.
//!
//! Ids are strings on the wire. Ids allocated by a scope are decimal
//! counters, which lets a scope keep a high-water-mark over every id it has
//! seen. Integer ids in JSON input are accepted and normalized to strings.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifier of a mirrored object, unique within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an id from an arbitrary string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the id for a counter value.
    #[must_use]
    pub fn from_counter(counter: u64) -> Self {
        Self(counter.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the counter value if this id is a decimal number.
    pub fn counter(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ObjectId {
    fn from(counter: u64) -> Self {
        Self::from_counter(counter)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ObjectId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object id (string or non-negative integer)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
                Ok(ObjectId::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ObjectId, E> {
                Ok(ObjectId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ObjectId, E> {
                Ok(ObjectId::from_counter(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ObjectId, E> {
                u64::try_from(v)
                    .map(ObjectId::from_counter)
                    .map_err(|_| E::custom(format!("negative object id {v}")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}
