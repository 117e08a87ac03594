use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error: {0}")]
    Deserialize(String),
}

impl SerializeError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Serialize(_) => ErrorClass::Serialize,
            Self::Deserialize(_) => ErrorClass::Deserialize,
        }
    }

    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Serialize(_) => ErrorOrigin::Pack,
            Self::Deserialize(_) => ErrorOrigin::Unpack,
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

/// Serialize a value to a JSON string, optionally pretty-printed.
pub fn to_json_string<T>(ty: &T, pretty: bool) -> Result<String, SerializeError>
where
    T: Serialize,
{
    let out = if pretty {
        serde_json::to_string_pretty(ty)
    } else {
        serde_json::to_string(ty)
    };

    out.map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Deserialize a value from a JSON string produced by [`to_json_string`].
pub fn from_json_str<T>(json: &str) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json).map_err(|e| SerializeError::Deserialize(e.to_string()))
}

/// Deserialize a value from an already-parsed JSON tree.
pub fn from_json_value<T>(json: serde_json::Value) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(json).map_err(|e| SerializeError::Deserialize(e.to_string()))
}
