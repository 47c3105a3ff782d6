//! Tool response envelope.
//!
//! Every tool response, success or error, is an [`Envelope`] holding exactly one
//! [`ContentPart::Text`] whose text is a serialized JSON object:
//!
//! ```json
//! { "content": [{ "type": "text", "text": "{\"files\":[...]}" }] }
//! ```
//!
//! Error envelopes additionally carry `"isError": true`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content parts
// ---------------------------------------------------------------------------

/// A single typed part of an envelope. Only text parts exist today; new kinds
/// (image, binary) become new variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
}

impl ContentPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Vec<ContentPart>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Envelope {
    /// Wrap a payload as a successful envelope.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Self {
        Self { content: vec![ContentPart::Text { text: stringify(payload) }], is_error: false }
    }

    /// Wrap a payload as an error envelope.
    pub fn error<T: Serialize + ?Sized>(payload: &T) -> Self {
        Self { content: vec![ContentPart::Text { text: stringify(payload) }], is_error: true }
    }

    /// Text of the first part, if it is a text part.
    pub fn text(&self) -> Option<&str> {
        self.content.first().and_then(ContentPart::as_text)
    }

    /// Parse the first text part back into JSON.
    pub fn payload(&self) -> Option<serde_json::Value> {
        self.text().and_then(|t| serde_json::from_str(t).ok())
    }
}

/// Serialize a payload to a JSON string. A payload that cannot be serialized
/// (non-string map keys, failing `Serialize` impls) still yields a JSON object.
fn stringify<T: Serialize + ?Sized>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|e| {
        serde_json::json!({ "error": "Failed to serialize tool result", "details": e.to_string() })
            .to_string()
    })
}
