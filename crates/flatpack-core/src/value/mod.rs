
use crate::{
    graph::{Entity, EntityKey},
    types::Timestamp,
};
use serde_json::Value as JsonValue;

///
/// Value
/// One property value held by an entity.
///
/// Scalars map one-to-one onto JSON scalars; `Timestamp` travels as an
/// RFC 3339 string. `Ref`/`RefList` point into the owning `Graph` and travel
/// as identifiers. `Embedded` owns a value whose fields are folded into the
/// owner's flat record.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Timestamp(Timestamp),
    /// Ordered list of scalars.
    List(Vec<Self>),
    Ref(EntityKey),
    /// Ordered reference list; `None` marks an element that did not resolve.
    RefList(Vec<Option<EntityKey>>),
    Embedded(Box<Entity>),
}

impl Value {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Reference list built from resolved keys.
    #[must_use]
    pub fn refs(keys: impl IntoIterator<Item = EntityKey>) -> Self {
        Self::RefList(keys.into_iter().map(Some).collect())
    }

    #[must_use]
    pub fn embedded(entity: Entity) -> Self {
        Self::Embedded(Box::new(entity))
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::RefList(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_reference(&self) -> Option<EntityKey> {
        match self {
            Self::Ref(key) => Some(*key),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference_list(&self) -> Option<&[Option<EntityKey>]> {
        match self {
            Self::RefList(keys) => Some(keys),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_embedded(&self) -> Option<&Entity> {
        match self {
            Self::Embedded(entity) => Some(entity),
            _ => None,
        }
    }

    /// Wire form of a scalar value.
    ///
    /// Returns `None` for graph-shaped values (references, embedded values)
    /// and for timestamps that cannot be rendered.
    #[must_use]
    pub fn to_json_scalar(&self) -> Option<JsonValue> {
        match self {
            Self::Bool(b) => Some(JsonValue::Bool(*b)),
            Self::Int(n) => Some(JsonValue::from(*n)),
            Self::Uint(n) => Some(JsonValue::from(*n)),
            Self::Float(n) => Some(JsonValue::from(*n)),
            Self::Text(s) => Some(JsonValue::String(s.clone())),
            Self::Timestamp(ts) => ts.to_rfc3339().ok().map(JsonValue::String),
            Self::List(items) => Some(JsonValue::Array(
                items.iter().filter_map(Self::to_json_scalar).collect(),
            )),
            Self::Ref(_) | Self::RefList(_) | Self::Embedded(_) => None,
        }
    }

    /// Value for a plain (non-reference) wire field.
    ///
    /// With `timestamp` set, strings and integers that parse as an absolute
    /// time become `Timestamp`; anything else keeps its scalar form.
    /// `null` and nested objects have no value form and yield `None`.
    #[must_use]
    pub fn from_json_scalar(json: &JsonValue, timestamp: bool) -> Option<Self> {
        match json {
            JsonValue::Null | JsonValue::Object(_) => None,
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Number(n) => {
                if timestamp
                    && let Some(ts) = n.as_i64().and_then(|s| Timestamp::from_unix_seconds(s).ok())
                {
                    return Some(Self::Timestamp(ts));
                }

                n.as_i64()
                    .map(Self::Int)
                    .or_else(|| n.as_u64().map(Self::Uint))
                    .or_else(|| n.as_f64().map(Self::Float))
            }
            JsonValue::String(s) => {
                if timestamp && let Ok(ts) = Timestamp::parse_flexible(s) {
                    return Some(Self::Timestamp(ts));
                }

                Some(Self::Text(s.clone()))
            }
            JsonValue::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|item| Self::from_json_scalar(item, false))
                    .collect(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<EntityKey> for Value {
    fn from(key: EntityKey) -> Self {
        Self::Ref(key)
    }
}

impl From<Vec<EntityKey>> for Value {
    fn from(keys: Vec<EntityKey>) -> Self {
        Self::refs(keys)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::embedded(entity)
    }
}
