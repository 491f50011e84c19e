use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ProductField;

/// Field key to message map shown inline next to form inputs.
///
/// Keys are plain strings rather than [`ProductField`] because a rejected
/// submission may name fields the form does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ProductField, message: impl Into<String>) {
        self.0.insert(field.key().to_string(), message.into());
    }

    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.get_key(field.key())
    }

    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, field: ProductField) -> Option<String> {
        self.0.remove(field.key())
    }

    pub fn contains(&self, field: ProductField) -> bool {
        self.0.contains_key(field.key())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reads a backend rejection body of the form `{"price": "must be positive"}`.
    ///
    /// Non-string members are skipped; `None` when the body is not a JSON
    /// object or carries no string members at all.
    pub fn from_json_bytes(body: &[u8]) -> Option<Self> {
        let Ok(Value::Object(members)) = serde_json::from_slice::<Value>(body) else {
            return None;
        };
        let errors: BTreeMap<String, String> = members
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(message) => Some((key, message)),
                _ => None,
            })
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }
}

impl FromIterator<(ProductField, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (ProductField, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, message)| (field.key().to_string(), message))
                .collect(),
        )
    }
}
