//! Record identifier newtype backed by a store-assigned integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Unique identifier for a [`Record`](crate::record::Record).
///
/// Always strictly positive. Clients may send it either as a JSON number
/// (`42`) or as a string (`"42"`), since query parameters are text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw value, rejecting zero and negatives.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIdentifier`] when `value <= 0`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidIdentifier)
        }
    }

    /// Access the inner integer.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidIdentifier)?;
        Self::new(value)
    }
}

impl TryFrom<&Value> for RecordId {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or(ValidationError::InvalidIdentifier)
                .and_then(Self::new),
            Value::String(s) => s.parse(),
            _ => Err(ValidationError::InvalidIdentifier),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::try_from(&raw).map_err(serde::de::Error::custom)
    }
}
