//! Canonical message record produced by decoding one inbound payload.
//!
//! A [`CanonicalMessage`] is a loosely-typed record: the platform sends
//! different field sets for realtime events, slash commands, outgoing
//! webhooks, and interactive buttons, and any of those fields may be absent.
//! Typed accessors cover the recognized fields; everything else stays
//! reachable through [`CanonicalMessage::get`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized in-memory record for one inbound platform message.
///
/// Built fresh per payload by [`crate::decode::decode`] and dropped after
/// dispatch. After decoding, the `payload` field, if present, is always an
/// object (the decoder resolves the platform's string-encoded JSON nesting).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMessage(Map<String, Value>);

impl CanonicalMessage {
    /// Create an empty message (no recognized fields, classifies as `*` only).
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an already-decoded field map.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up an arbitrary top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Whether the record carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying field map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the message, yielding the underlying field map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    // ------------------------------------------------------------------
    // Recognized-field accessors
    // ------------------------------------------------------------------

    /// Top-level `type` field (typed payloads such as verification handshakes).
    pub fn message_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// `event.type` from a realtime-event payload.
    pub fn event_type(&self) -> Option<&str> {
        self.0
            .get("event")
            .and_then(Value::as_object)
            .and_then(|event| event.get("type"))
            .and_then(Value::as_str)
    }

    /// `command` field from a slash-command payload.
    pub fn command(&self) -> Option<&str> {
        self.0.get("command").and_then(Value::as_str)
    }

    /// `trigger_word` field from an outgoing-webhook payload.
    pub fn trigger_word(&self) -> Option<&str> {
        self.0.get("trigger_word").and_then(Value::as_str)
    }

    /// Interactive `payload` object, when present.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.0.get("payload").and_then(Value::as_object)
    }

    /// `payload.callback_id` from an interactive-button payload.
    pub fn callback_id(&self) -> Option<&str> {
        self.payload()
            .and_then(|payload| payload.get("callback_id"))
            .and_then(Value::as_str)
    }

    /// Verification `challenge` field, when present.
    ///
    /// The transport echoes this back verbatim during subscription setup;
    /// this crate only surfaces it.
    pub fn challenge(&self) -> Option<&str> {
        self.0.get("challenge").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for CanonicalMessage {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
