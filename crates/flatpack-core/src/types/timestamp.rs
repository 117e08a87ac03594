use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

///
/// TimestampError
///

#[derive(Debug, ThisError)]
pub enum TimestampError {
    #[error("timestamp parse error: {0}")]
    Parse(String),

    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),

    #[error("timestamp format error: {0}")]
    Format(String),
}

///
/// Timestamp
/// Absolute point in time, always normalized to UTC.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub const EPOCH: Self = Self(OffsetDateTime::UNIX_EPOCH);

    /// Construct from Unix seconds.
    pub fn from_unix_seconds(secs: i64) -> Result<Self, TimestampError> {
        OffsetDateTime::from_unix_timestamp(secs)
            .map(Self)
            .map_err(|_| TimestampError::OutOfRange(secs))
    }

    /// Construct from any offset date-time, converting it to UTC.
    #[must_use]
    pub fn from_offset_date_time(dt: OffsetDateTime) -> Self {
        Self(dt.to_offset(UtcOffset::UTC))
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampError> {
        let dt = OffsetDateTime::parse(s, &Rfc3339)
            .map_err(|e| TimestampError::Parse(e.to_string()))?;

        Ok(Self::from_offset_date_time(dt))
    }

    pub fn parse_flexible(s: &str) -> Result<Self, TimestampError> {
        // Try integer seconds
        if let Ok(n) = s.trim().parse::<i64>() {
            return Self::from_unix_seconds(n);
        }

        // Try RFC3339
        Self::parse_rfc3339(s.trim())
    }

    /// Render as an RFC 3339 string in UTC (`...Z`).
    pub fn to_rfc3339(&self) -> Result<String, TimestampError> {
        self.0
            .format(&Rfc3339)
            .map_err(|e| TimestampError::Format(e.to_string()))
    }

    #[must_use]
    pub const fn unix_seconds(&self) -> i64 {
        self.0.unix_timestamp()
    }

    #[must_use]
    pub const fn get(self) -> OffsetDateTime {
        self.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = self.to_rfc3339().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse_flexible(&raw).map_err(D::Error::custom)
    }
}

///
/// TESTS
///
