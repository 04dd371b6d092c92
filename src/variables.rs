//! Ordered placeholder variables.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Mapping from placeholder key to replacement text.
///
/// Keys keep the position of their first insertion. Inserting an existing
/// key replaces its value, so the last value wins. Substitution tries keys in
/// this order.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Variables {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of string values, keeping the object's key
    /// order.
    ///
    /// Values are not coerced: numbers, booleans, nulls and nested values are
    /// rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use docx_template::Variables;
    ///
    /// let vars = Variables::from_json(r#"{"name": "Alice", "city": "Oslo"}"#)?;
    /// assert_eq!(vars.get("name"), Some("Alice"));
    /// # Ok::<(), docx_template::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidVariables("expected a JSON object".to_string()))?;

        let mut vars = Self::new();
        for (key, value) in object {
            match value {
                serde_json::Value::String(s) => vars.insert(key.clone(), s.clone()),
                other => {
                    return Err(Error::InvalidVariables(format!(
                        "value of '{}' must be a string, found {}",
                        key, other
                    )))
                }
            }
        }
        Ok(vars)
    }

    /// Insert or overwrite a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Add every entry of `other` whose key is not present yet.
    ///
    /// Existing values are never overwritten.
    pub fn merge_missing(&mut self, other: &Variables) {
        for (key, value) in other.iter() {
            if !self.contains_key(key) {
                self.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Variables {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Variables {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        vars.extend(iter);
        vars
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Variables {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
