//! Decoded record structure.
//!
//! A [`Record`] is the dynamic, schema-agnostic result of decoding one line:
//! an ordered map from column name to [`Value`].
//!
//! # Examples
//!
//! ```
//! use fixcol::{Record, Value};
//!
//! let record = Record::builder()
//!     .field("id", 42_i64)
//!     .field("name", "ACME")
//!     .build();
//!
//! assert_eq!(record.get("id"), Some(&Value::Integer(42)));
//! assert_eq!(record.len(), 2);
//! ```

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A decoded fixed-width record.
///
/// Fields are stored in insertion order using `IndexMap`. The codec inserts
/// them in ascending column position, so iteration follows the line layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Record {
            fields: IndexMap::new(),
        }
    }

    /// Create a builder for fluently constructing records
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder {
            record: Record::new(),
        }
    }

    /// Get a field value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set or replace a field value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// True when the field is absent or explicitly null
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        self.fields.get(name).map_or(true, Value::is_null)
    }

    /// True when the record carries the named field (null or not)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Take a field value out of the record, leaving `Null` behind
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.get_mut(name).map(std::mem::take)
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Missing fields index as [`Value::Null`].
    fn index(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(name).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builder for [`Record`]
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a field to the record being built
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.set(name, value);
        self
    }

    /// Add a null field
    #[must_use]
    pub fn null(mut self, name: impl Into<String>) -> Self {
        self.record.set(name, Value::Null);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}
