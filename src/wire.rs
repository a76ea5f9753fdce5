//! Decoding of wire-encoded values.
//!
//! Every entity, relation and metadata field coming from the graph store may
//! be either plain text or a JSON envelope around a serialized string value:
//!
//! ```json
//! {"typeUrl": "type.googleapis.com/google.protobuf.StringValue", "value": "0a0548656c6c6f"}
//! ```
//!
//! `value` is the hex form of the payload bytes. Producers disagree on whether
//! the payload carries the protobuf field header (`0x0A` tag followed by a
//! one-byte length), so the header treatment is selectable via [`HeaderMode`].
//! Decoding is best-effort: anything that does not look like an envelope is
//! returned unchanged.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Tag byte of a length-delimited protobuf field number 1.
pub const FIELD_TAG: u8 = 0x0A;

/// Type URL written by [`encode`].
pub const STRING_VALUE_TYPE_URL: &str = "type.googleapis.com/google.protobuf.StringValue";

/// How the two-byte field header in front of the payload is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Skip the header only when the tag is `0x0A` and the length byte
    /// matches the number of bytes that follow it.
    #[default]
    Detect,
    /// Skip the first two bytes whenever the first byte is `0x0A`.
    Strip,
    /// Never skip anything; every non-zero byte becomes a character.
    Keep,
}

impl std::fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderMode::Detect => write!(f, "detect"),
            HeaderMode::Strip => write!(f, "strip"),
            HeaderMode::Keep => write!(f, "keep"),
        }
    }
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detect" | "Detect" => Ok(HeaderMode::Detect),
            "strip" | "Strip" => Ok(HeaderMode::Strip),
            "keep" | "Keep" => Ok(HeaderMode::Keep),
            _ => Err(format!(
                "Invalid header mode '{}'. Valid values: detect, strip, keep",
                s
            )),
        }
    }
}

/// Outcome of decoding a wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The input was an envelope and its payload was decoded.
    Text(String),
    /// The input was not a decodable envelope; carries the input unchanged.
    Fallback(String),
}

impl Decoded {
    /// Returns the decoded text, or the original input for a fallback.
    pub fn into_string(self) -> String {
        match self {
            Decoded::Text(s) | Decoded::Fallback(s) => s,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Decoded::Text(s) | Decoded::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Fallback(_))
    }
}

/// Decodes a wire value with header detection. Never fails.
pub fn decode(input: &str) -> String {
    decode_with(input, HeaderMode::Detect).into_string()
}

/// Decodes a wire value using the given header treatment.
pub fn decode_with(input: &str, mode: HeaderMode) -> Decoded {
    match envelope_payload(input) {
        Some(bytes) => Decoded::Text(bytes_to_text(strip_header(&bytes, mode))),
        None => Decoded::Fallback(input.to_string()),
    }
}

/// Encodes text as a string-value envelope with the field header.
///
/// Payloads of 128 bytes or more are written without the header, since their
/// length does not fit a single varint byte.
pub fn encode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut payload = Vec::with_capacity(bytes.len() + 2);
    if let Ok(len) = u8::try_from(bytes.len()) {
        if len < 0x80 {
            payload.push(FIELD_TAG);
            payload.push(len);
        }
    }
    payload.extend_from_slice(bytes);

    serde_json::json!({
        "typeUrl": STRING_VALUE_TYPE_URL,
        "value": hex::encode(payload),
    })
    .to_string()
}

/// Extracts the payload bytes when `input` is a well-formed envelope.
fn envelope_payload(input: &str) -> Option<Vec<u8>> {
    let parsed: JsonValue = serde_json::from_str(input).ok()?;
    let object = parsed.as_object()?;

    let type_url = object.get("typeUrl").and_then(JsonValue::as_str)?;
    let value = object.get("value").and_then(JsonValue::as_str)?;
    if type_url.is_empty() || value.is_empty() {
        return None;
    }

    hex::decode(value).ok()
}

fn strip_header(bytes: &[u8], mode: HeaderMode) -> &[u8] {
    match (mode, bytes) {
        (HeaderMode::Strip, [FIELD_TAG, _, rest @ ..]) => rest,
        (HeaderMode::Detect, [FIELD_TAG, len, rest @ ..]) if usize::from(*len) == rest.len() => {
            rest
        }
        _ => bytes,
    }
}

/// One character per byte; zero bytes are dropped.
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}
