//! Wire value model wrapping the raw field representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::wire::{self, Decoded, HeaderMode};

/// A field value as it travels over the wire.
///
/// The store sends either a string (plain text, or a JSON envelope serialized
/// into a string) or the envelope as an inline JSON object. Both are kept as
/// the raw JSON text so the decoder sees the same input either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WireValue(String);

impl WireValue {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Wraps `text` in a string-value envelope.
    pub fn encoded(text: &str) -> Self {
        Self(wire::encode(text))
    }

    /// The raw representation as received.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Decoded text with header detection.
    pub fn text(&self) -> String {
        wire::decode(&self.0)
    }

    /// Decoded text using the given header treatment.
    pub fn decode(&self, mode: HeaderMode) -> Decoded {
        wire::decode_with(&self.0, mode)
    }
}

impl From<&str> for WireValue {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for WireValue {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(match value {
            JsonValue::String(s) => Self(s),
            JsonValue::Null => Self::default(),
            other => Self(other.to_string()),
        })
    }
}
