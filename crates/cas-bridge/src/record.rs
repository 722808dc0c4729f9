//! User attribute records produced by a successful handshake.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute key that every record produced by the bridge starts from.
pub const USERNAME_KEY: &str = "username";

/// A user attribute record: attribute name to value, built fresh on every
/// successful handshake.
///
/// The record always starts from a `username` key; CAS-supplied attributes
/// are merged in afterwards, so an attribute literally named `username`
/// takes precedence over the principal name. The bridge hands the record
/// to the caller and retains nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    attributes: HashMap<String, Value>,
}

impl UserRecord {
    /// Build a record from a principal name and its protocol attributes.
    pub fn new<I>(username: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut map = HashMap::new();
        map.insert(USERNAME_KEY.to_string(), Value::String(username.into()));
        map.extend(attributes);
        Self { attributes: map }
    }

    /// An empty record. Listeners returning this are treated as "no override".
    pub fn empty() -> Self {
        Self::default()
    }

    /// The `username` attribute, when present and a string.
    pub fn username(&self) -> Option<&str> {
        self.attributes.get(USERNAME_KEY).and_then(Value::as_str)
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }
}

impl FromIterator<(String, Value)> for UserRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
