//! Entity identifiers.
//!
//! The API is not consistent about id types: app users and meals carry
//! numeric ids, recipes sometimes carry string ids. The client keeps every
//! id as an opaque string and coerces at the serde boundary:
//!
//! - reading: JSON numbers and strings are both accepted
//! - writing: an id that is a canonical unsigned integer is emitted as a
//!   JSON number, anything else as a string

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque server-assigned identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from its textual form
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Textual form, as used in URL paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, when the id is a canonical unsigned integer
    ///
    /// `"007"` is not canonical and returns `None` so that it round-trips
    /// as a string.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        let value = self.0.parse::<u64>().ok()?;
        (value.to_string() == self.0).then_some(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(number) => serializer.serialize_u64(number),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireId::deserialize(deserializer)? {
            WireId::Unsigned(value) => Self(value.to_string()),
            WireId::Signed(value) => Self(value.to_string()),
            WireId::Text(value) => Self(value),
        })
    }
}
