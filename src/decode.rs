//! Wire decoder -- normalizes inbound payload formats into a [`CanonicalMessage`].
//!
//! The platform delivers three shapes on the wire: a JSON object (event
//! subscriptions), a JSON text frame (realtime socket), and a URL-encoded
//! form body (slash commands, outgoing webhooks, interactive buttons).
//! Interactive bodies additionally hide their real content one level deeper,
//! as a JSON string under the `payload` form field. Decoding flattens all of
//! that into a single record shape so the classifier sees one format.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::message::CanonicalMessage;

/// Decoder errors.
///
/// Only the nested `payload` field can fail hard: a top-level body that is
/// neither JSON nor form data degrades to an empty record instead (the
/// classifier then yields just the wildcard topic).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The `payload` field claimed to be a JSON string but did not parse.
    #[error("malformed interactive payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    /// The `payload` field parsed to something other than a JSON object.
    #[error("interactive payload is not a JSON object")]
    NonObjectPayload,
}

/// A raw inbound payload as handed over by a transport.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Body text straight off the wire (JSON or URL-encoded form).
    Text(String),
    /// A structure the transport already parsed.
    Structured(Value),
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Decode a raw inbound payload into a [`CanonicalMessage`].
///
/// Text input is tried as JSON first and falls back to URL-encoded form
/// decoding; structured input passes through. In both cases the `payload`
/// field, if it arrives as a JSON string, is parsed and replaced by its
/// object form. Decoding an already-normalized record is a no-op.
///
/// # Errors
///
/// Returns [`DecodeError`] only for a corrupt nested `payload` field; every
/// other malformed input degrades to an empty record.
pub fn decode(raw: impl Into<RawPayload>) -> Result<CanonicalMessage, DecodeError> {
    let record = match raw.into() {
        RawPayload::Text(text) => decode_text(&text),
        RawPayload::Structured(Value::Object(map)) => map,
        RawPayload::Structured(other) => {
            debug!(kind = value_kind(&other), "non-object structured payload, degrading to empty record");
            Map::new()
        }
    };
    let record = resolve_payload_field(record)?;
    Ok(CanonicalMessage::from_map(record))
}

/// Decode body text: JSON object first, URL-encoded form as the fallback.
fn decode_text(text: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!(kind = value_kind(&other), "valid JSON but not an object, trying form decode");
            decode_form(text)
        }
        Err(_) => decode_form(text),
    }
}

/// Decode a URL-encoded form body into a string-valued record.
///
/// Never fails: segments without an `=` are skipped, and a body with no
/// recognizable pairs yields an empty record.
fn decode_form(text: &str) -> Map<String, Value> {
    let mut record = Map::new();
    for segment in text.split('&') {
        if !segment.contains('=') {
            continue;
        }
        for (key, value) in url::form_urlencoded::parse(segment.as_bytes()) {
            record.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }
    record
}

/// Resolve one level of string-encoded JSON nesting in the `payload` field.
///
/// Interactive bodies arrive as form data whose `payload` field is itself a
/// JSON document. After this step the field is always an object, so readers
/// never have to re-parse it.
fn resolve_payload_field(mut record: Map<String, Value>) -> Result<Map<String, Value>, DecodeError> {
    let encoded = match record.get("payload") {
        Some(Value::String(encoded)) => encoded.clone(),
        _ => return Ok(record),
    };
    match serde_json::from_str::<Value>(&encoded)? {
        Value::Object(payload) => {
            record.insert("payload".to_owned(), Value::Object(payload));
            Ok(record)
        }
        _ => Err(DecodeError::NonObjectPayload),
    }
}

/// Short name for a JSON value's kind, for log fields.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_text_passes_through() {
        let msg = decode(r#"{"command":"/test","text":"hi"}"#).expect("should decode");
        assert_eq!(msg.command(), Some("/test"));
        assert_eq!(msg.get("text"), Some(&json!("hi")));
    }

    #[test]
    fn test_structured_object_passes_through() {
        let msg = decode(json!({"trigger_word": "bot"})).expect("should decode");
        assert_eq!(msg.trigger_word(), Some("bot"));
    }

    #[test]
    fn test_form_fallback_on_malformed_json() {
        let msg = decode("token=abc&text=hi").expect("should decode");
        assert_eq!(msg.get("token"), Some(&json!("abc")));
        assert_eq!(msg.get("text"), Some(&json!("hi")));
    }

    #[test]
    fn test_form_percent_and_plus_decoding() {
        let msg = decode("command=%2Fdeploy&text=hello+world").expect("should decode");
        assert_eq!(msg.command(), Some("/deploy"));
        assert_eq!(msg.get("text"), Some(&json!("hello world")));
    }

    #[test]
    fn test_form_segment_without_equals_is_skipped() {
        let msg = decode("garbage&token=abc").expect("should decode");
        assert_eq!(msg.get("garbage"), None);
        assert_eq!(msg.get("token"), Some(&json!("abc")));
    }

    #[test]
    fn test_empty_text_yields_empty_record() {
        let msg = decode("").expect("should decode");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_non_pair_text_yields_empty_record() {
        let msg = decode("not json, not a form").expect("should decode");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_json_scalar_text_yields_empty_record() {
        // Valid JSON, but not an object: degraded case, no hard error.
        let msg = decode("42").expect("should decode");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_structured_non_object_yields_empty_record() {
        let msg = decode(json!(["a", "b"])).expect("should decode");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_string_payload_field_is_parsed() {
        let msg = decode(json!({"payload": r#"{"callback_id":"btn1"}"#})).expect("should decode");
        assert_eq!(msg.callback_id(), Some("btn1"));
        assert_eq!(msg.get("payload"), Some(&json!({"callback_id": "btn1"})));
    }

    #[test]
    fn test_payload_inside_form_body_is_parsed() {
        let msg = decode("payload=%7B%22callback_id%22%3A%22btn1%22%7D").expect("should decode");
        assert_eq!(msg.callback_id(), Some("btn1"));
    }

    #[test]
    fn test_malformed_string_payload_is_a_hard_error() {
        let err = decode(json!({"payload": "{not json"})).expect_err("should fail");
        assert!(matches!(err, DecodeError::MalformedPayload(_)));
    }

    #[test]
    fn test_non_object_string_payload_is_a_hard_error() {
        let err = decode(json!({"payload": "[1,2,3]"})).expect_err("should fail");
        assert!(matches!(err, DecodeError::NonObjectPayload));
    }

    #[test]
    fn test_object_payload_passes_through_untouched() {
        let input = json!({"payload": {"callback_id": "btn1"}, "team": "T1"});
        let msg = decode(input.clone()).expect("should decode");
        assert_eq!(Value::Object(msg.into_map()), input);
    }

    #[test]
    fn test_decode_is_idempotent_on_normalized_records() {
        let first = decode(json!({"payload": r#"{"callback_id":"btn1"}"#, "type": "interactive"}))
            .expect("should decode");
        let second = decode(Value::Object(first.as_map().clone())).expect("should decode again");
        assert_eq!(second, first);
    }
}
