use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error as ThisError;
use uuid::Uuid;

///
/// EntityIdError
///

#[derive(Debug, ThisError)]
pub enum EntityIdError {
    #[error("invalid entity id string: '{0}'")]
    InvalidString(String),
}

///
/// EntityId
///
/// Universally-unique entity identity. Rendered on the wire as a hyphenated
/// UUID string under the `uuid` field and every `<name>Uuid` reference.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deref,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// from_u128
    #[must_use]
    pub const fn from_u128(n: u128) -> Self {
        Self(Uuid::from_u128(n))
    }

    /// generate
    /// Generate a fresh random (v4) identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// try_from_str
    pub fn try_from_str(encoded: &str) -> Result<Self, EntityIdError> {
        Uuid::parse_str(encoded)
            .map(Self)
            .map_err(|_| EntityIdError::InvalidString(encoded.to_string()))
    }

    /// Parse an identity out of a JSON value; only strings qualify.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        value.as_str().and_then(|s| Self::try_from_str(s).ok())
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(s)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for serde_json::Value {
    fn from(id: EntityId) -> Self {
        Self::String(id.to_string())
    }
}

///
/// TESTS
///
