//! Records and record identifiers
//!
//! A [`Record`] is a schema-less mapping from field names to [`Value`]s.
//! One field is reserved: `_id`, the record's string identifier. Catalogs keep
//! their records sorted by `_id` under [`compare_ids`], which is what makes
//! identifier lookup and insertion a binary search.

use crate::value::{Map, Value};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Name of the reserved identifier field
pub const ID_FIELD: &str = "_id";

/// Order two identifiers
///
/// Identifiers are opaque strings ordered byte-wise lexicographically.
/// Every sort-order decision in the store goes through this function.
#[inline]
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Opaque, globally unique record identifier
///
/// Ordering is [`compare_ids`] ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identifier string
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Borrow the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the identifier string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

/// A single schema-less document
///
/// Serializes as the plain JSON object of its fields, `_id` included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Record { fields: Map::new() }
    }

    /// Create a record from a field map
    pub fn from_fields(fields: Map) -> Self {
        Record { fields }
    }

    /// Create a record from a value
    ///
    /// Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        value.into_object().map(Record::from_fields)
    }

    /// The record's identifier, if it carries a string `_id`
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Identifier used for ordering
    ///
    /// Stored records always carry an id; a record without one sorts first.
    pub fn sort_key(&self) -> &str {
        self.id().unwrap_or("")
    }

    /// Assign the identifier, replacing any previous `_id`
    pub fn set_id(&mut self, id: &RecordId) {
        self.fields
            .insert(ID_FIELD.to_string(), Value::String(id.as_str().to_string()));
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Shallow merge: every field of `patch` overwrites the same field here
    pub fn merge_from(&mut self, patch: Record) {
        self.fields.extend(patch.fields);
    }

    /// Borrow the field map
    pub fn fields(&self) -> &Map {
        &self.fields
    }

    /// Number of fields, `_id` included
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a [`Value::Object`]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        r.into_value()
    }
}
