//! The normalized wire document.
//!
//! ```json
//! { "data": { "testEntity": [ { "one": "first", "uuid": "…" } ] }, "value": "…" }
//! ```
//!
//! Parsing is lenient: a missing `data` section is empty, bucket values that
//! are not arrays and records that are not objects are skipped, and a `value`
//! entry that is not an identity string reads as absent at its position.

use crate::{
    error::InternalError,
    serialize::{SerializeError, from_json_str, from_json_value, to_json_string},
    types::EntityId,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::Value as JsonValue;

///
/// Record
/// One flat record; field order is preserved.
///

pub type Record = serde_json::Map<String, JsonValue>;

///
/// Buckets
/// Type name → records, in first-use order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Buckets {
    buckets: Vec<(String, Vec<Record>)>,
}

impl Buckets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a bucket, creating the bucket on first use.
    pub fn push(&mut self, name: &str, record: Record) {
        match self.buckets.iter_mut().find(|(n, _)| n == name) {
            Some((_, records)) => records.push(record),
            None => self.buckets.push((name.to_string(), vec![record])),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.buckets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.buckets
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of records across all buckets.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|(_, records)| records.len()).sum()
    }

    // Lenient conversion from an arbitrary JSON tree.
    fn from_json_lenient(json: JsonValue) -> Self {
        let mut out = Self::new();

        let JsonValue::Object(map) = json else {
            return out;
        };

        for (name, bucket) in map {
            let JsonValue::Array(items) = bucket else {
                continue;
            };
            for item in items {
                if let JsonValue::Object(record) = item {
                    out.push(&name, record);
                }
            }
        }

        out
    }
}

impl Serialize for Buckets {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (name, records) in &self.buckets {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Buckets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Self::from_json_lenient)
    }
}

///
/// DocumentValue
/// Identity of the logical root, or roots. `None` marks an entry that did
/// not hold an identity string.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentValue {
    One(Option<EntityId>),
    Many(Vec<Option<EntityId>>),
}

impl DocumentValue {
    fn from_json_lenient(json: &JsonValue) -> Self {
        match json {
            JsonValue::Array(items) => Self::Many(items.iter().map(EntityId::from_json).collect()),
            other => Self::One(EntityId::from_json(other)),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(|json| Self::from_json_lenient(&json))
    }
}

///
/// Document
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Document {
    #[serde(default)]
    pub data: Buckets,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DocumentValue>,
}

impl Document {
    /// Empty, well-formed document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.value.is_none()
    }

    /// Records of one bucket; empty when the bucket does not exist.
    #[must_use]
    pub fn records(&self, bucket: &str) -> &[Record] {
        self.data.get(bucket).unwrap_or_default()
    }

    /// Find a record by its identity within a bucket.
    #[must_use]
    pub fn record(&self, bucket: &str, id: EntityId) -> Option<&Record> {
        let wanted = JsonValue::from(id);

        self.records(bucket)
            .iter()
            .find(|record| record.get(crate::casing::ID_FIELD) == Some(&wanted))
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, InternalError> {
        to_json_string(self, pretty).map_err(InternalError::from)
    }

    pub fn to_json_value(&self) -> Result<JsonValue, InternalError> {
        serde_json::to_value(self)
            .map_err(|e| InternalError::from(SerializeError::Serialize(e.to_string())))
    }

    pub fn from_json_str(json: &str) -> Result<Self, InternalError> {
        from_json_str(json).map_err(InternalError::from)
    }

    pub fn from_json_value(json: JsonValue) -> Result<Self, InternalError> {
        from_json_value(json).map_err(InternalError::from)
    }
}

///
/// TESTS
///
