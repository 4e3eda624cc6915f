//! Module defines [RawToken], a user supplied value which has not been canonicalized yet
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::number::{DpNumber, InvalidDpNumber, InvalidReason};

/// A single token from a submitted batch.
/// Clients may send either json strings or json numbers; anything else is kept so that it
/// can be reported back as malformed.
///
/// Json numbers are read as written. Integer valued floats such as `7.0` or `1e3` are not
/// coerced and are rejected as decimals, so clients must send integer literals.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToken {
    /// a json string, kept verbatim
    Text(String),
    /// a json number
    Number(serde_json::Number),
    /// any other json value
    Other(serde_json::Value),
}

impl RawToken {
    /// Canonicalize this token into a [DpNumber]
    pub fn canonicalize(&self) -> Result<DpNumber, InvalidDpNumber> {
        match self {
            RawToken::Text(text) => DpNumber::canonicalize(text),
            RawToken::Number(number) => DpNumber::canonicalize(&number.to_string()),
            RawToken::Other(value) => Err(InvalidDpNumber::new(
                value.to_string(),
                InvalidReason::NotAnInteger,
            )),
        }
    }
}

impl fmt::Display for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawToken::Text(text) => write!(f, "{text}"),
            RawToken::Number(number) => write!(f, "{number}"),
            RawToken::Other(value) => write!(f, "{value}"),
        }
    }
}

impl From<serde_json::Value> for RawToken {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => RawToken::Text(text),
            serde_json::Value::Number(number) => RawToken::Number(number),
            other => RawToken::Other(other),
        }
    }
}

impl From<&str> for RawToken {
    fn from(value: &str) -> Self {
        RawToken::Text(value.to_string())
    }
}

impl From<String> for RawToken {
    fn from(value: String) -> Self {
        RawToken::Text(value)
    }
}

impl From<i64> for RawToken {
    fn from(value: i64) -> Self {
        RawToken::Number(value.into())
    }
}

impl<'de> Deserialize<'de> for RawToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(RawToken::from)
    }
}

impl Serialize for RawToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RawToken::Text(text) => serializer.serialize_str(text),
            RawToken::Number(number) => number.serialize(serializer),
            RawToken::Other(value) => value.serialize(serializer),
        }
    }
}
