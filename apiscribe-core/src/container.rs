//! Container keys and the keyed-container capability the engine runs on.
//!
//! The engine never parses text. It reads and writes named values through
//! [`DecodingContainer`] and [`EncodingContainer`], implemented here for the
//! crate's [`FieldMap`] and for `serde_json::Map`.

use crate::error::{ScribeError, ScribeResult};
use apiscribe_types::{FieldMap, FieldValue};
use std::fmt;

/// A validated string key into a keyed container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DynamicKey(String);

impl DynamicKey {
    /// Synthesizes a key, rejecting empty, blank or control-character keys.
    pub fn new(key: &str) -> ScribeResult<Self> {
        if key.trim().is_empty() || key.chars().any(char::is_control) {
            return Err(ScribeError::InvalidFieldKey {
                key: key.to_string(),
            });
        }
        Ok(Self(key.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DynamicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DynamicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read side of a keyed container.
pub trait DecodingContainer {
    fn contains_key(&self, key: &DynamicKey) -> bool;

    /// Returns the value at `key`.
    ///
    /// `None` means the key is absent; an explicit null is
    /// `Some(FieldValue::Null)`.
    fn decode_value(&self, key: &DynamicKey) -> Option<FieldValue>;
}

/// Write side of a keyed container.
pub trait EncodingContainer {
    /// Writes `value` at `key`, replacing any earlier value.
    fn encode_value(&mut self, key: &DynamicKey, value: FieldValue);
}

impl DecodingContainer for FieldMap {
    fn contains_key(&self, key: &DynamicKey) -> bool {
        self.contains_key(key.as_str())
    }

    fn decode_value(&self, key: &DynamicKey) -> Option<FieldValue> {
        self.get(key.as_str()).cloned()
    }
}

impl EncodingContainer for FieldMap {
    fn encode_value(&mut self, key: &DynamicKey, value: FieldValue) {
        self.insert(key.as_str().to_string(), value);
    }
}

impl DecodingContainer for serde_json::Map<String, serde_json::Value> {
    fn contains_key(&self, key: &DynamicKey) -> bool {
        self.contains_key(key.as_str())
    }

    fn decode_value(&self, key: &DynamicKey) -> Option<FieldValue> {
        self.get(key.as_str()).cloned().map(FieldValue::from)
    }
}

impl EncodingContainer for serde_json::Map<String, serde_json::Value> {
    fn encode_value(&mut self, key: &DynamicKey, value: FieldValue) {
        self.insert(key.as_str().to_string(), value.into());
    }
}
