//! Frame decoding for the observed wire format.
//!
//! Application frames are text payloads of the shape `<digits>[json array]`:
//! an engine.io packet-type prefix followed by a JSON array whose first
//! element names the event and whose optional second element carries the
//! payload. Everything else on the wire (pings, no-ops, handshake blobs) is
//! control traffic and is rejected with [`DecodeError::NoFramePrefix`] -
//! filtering it out is the point, not a fault.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A raw payload as handed over by a transport adapter.
///
/// Transports differ in what they surface: a bare text frame, a binary
/// frame, or a structured event object (a DOM-style `MessageEvent`) whose
/// `data` member holds the text.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// A bare text frame.
    Text(String),
    /// A binary frame. Never an application event on this protocol.
    Binary(Bytes),
    /// A structured event object carrying the text in its `data` member.
    Event(Value),
}

impl From<String> for RawPayload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// A decoded application message. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedMessage {
    /// The event name, first element of the wire array.
    pub event_name: String,
    /// The payload, second element of the wire array.
    ///
    /// `None` when the wire array had a single element (legal); an explicit
    /// JSON `null` decodes to `Some(Value::Null)`.
    pub payload: Option<Value>,
}

/// Why a payload did not decode to an application message.
///
/// None of these are fatal: a frame that fails to decode is simply not
/// published, and the next frame is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload was binary, or a structured event without a text `data`.
    #[error("payload is not text")]
    NotText,
    /// No leading digit prefix followed by `[` - a control frame or other
    /// non-event traffic.
    #[error("no event frame prefix")]
    NoFramePrefix,
    /// The frame body after the prefix was not valid JSON.
    #[error("malformed JSON in frame body: {0}")]
    MalformedJson(String),
    /// The frame body parsed but was not a non-empty array with a string
    /// event name.
    #[error("frame body is not a non-empty event array")]
    EmptyOrNotArray,
}

/// Decode a raw transport payload into a [`DecodedMessage`].
///
/// # Errors
///
/// Returns a [`DecodeError`] describing why the payload is not an
/// application event frame. Never panics, whatever the input.
pub fn decode(raw: &RawPayload) -> Result<DecodedMessage, DecodeError> {
    let text = normalize(raw)?;
    let body = strip_packet_prefix(text)?;

    let value: Value =
        serde_json::from_str(body).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;

    let array = value.as_array().ok_or(DecodeError::EmptyOrNotArray)?;
    let event_name = array
        .first()
        .and_then(Value::as_str)
        .ok_or(DecodeError::EmptyOrNotArray)?;

    Ok(DecodedMessage {
        event_name: event_name.to_owned(),
        payload: array.get(1).cloned(),
    })
}

/// Extract the text carried by the payload.
fn normalize(raw: &RawPayload) -> Result<&str, DecodeError> {
    match raw {
        RawPayload::Text(s) => Ok(s),
        RawPayload::Binary(_) => Err(DecodeError::NotText),
        RawPayload::Event(v) => v
            .get("data")
            .and_then(Value::as_str)
            .ok_or(DecodeError::NotText),
    }
}

/// Strip the engine.io packet-type prefix: one or more ASCII digits, with
/// the remainder beginning a JSON array.
fn strip_packet_prefix(text: &str) -> Result<&str, DecodeError> {
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return Err(DecodeError::NoFramePrefix);
    }
    let rest = &text[digits..];
    if rest.starts_with('[') {
        Ok(rest)
    } else {
        Err(DecodeError::NoFramePrefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_text(s: &str) -> Result<DecodedMessage, DecodeError> {
        decode(&RawPayload::from(s))
    }

    #[test]
    fn decodes_event_with_payload() {
        let msg = decode_text(r#"42["chat",{"msg":"hi"}]"#).unwrap();
        assert_eq!(msg.event_name, "chat");
        assert_eq!(msg.payload, Some(json!({"msg": "hi"})));
    }

    #[test]
    fn decodes_event_without_payload() {
        let msg = decode_text(r#"42["heartbeat"]"#).unwrap();
        assert_eq!(msg.event_name, "heartbeat");
        assert_eq!(msg.payload, None);
    }

    #[test]
    fn explicit_null_payload_is_preserved() {
        let msg = decode_text(r#"42["ack",null]"#).unwrap();
        assert_eq!(msg.payload, Some(Value::Null));
    }

    #[test]
    fn missing_prefix_is_rejected() {
        assert_eq!(decode_text(r#"["chat",1]"#), Err(DecodeError::NoFramePrefix));
    }

    #[test]
    fn control_frames_are_rejected() {
        // Ping and no-op frames carry a digit prefix but no array body.
        assert_eq!(decode_text("2"), Err(DecodeError::NoFramePrefix));
        assert_eq!(decode_text("3probe"), Err(DecodeError::NoFramePrefix));
        assert_eq!(
            decode_text(r#"40{"sid":"abc"}"#),
            Err(DecodeError::NoFramePrefix)
        );
    }

    #[test]
    fn binary_payload_is_not_text() {
        let raw = RawPayload::Binary(Bytes::from_static(b"\x04\x01\x02"));
        assert_eq!(decode(&raw), Err(DecodeError::NotText));
    }

    #[test]
    fn event_object_with_text_data_decodes() {
        let raw = RawPayload::Event(json!({"data": r#"42["chat","yo"]"#, "origin": "wss://x"}));
        let msg = decode(&raw).unwrap();
        assert_eq!(msg.event_name, "chat");
        assert_eq!(msg.payload, Some(json!("yo")));
    }

    #[test]
    fn event_object_without_text_data_is_not_text() {
        let raw = RawPayload::Event(json!({"data": 17}));
        assert_eq!(decode(&raw), Err(DecodeError::NotText));
        let raw = RawPayload::Event(json!({"origin": "wss://x"}));
        assert_eq!(decode(&raw), Err(DecodeError::NotText));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert_eq!(decode_text("3[]"), Err(DecodeError::EmptyOrNotArray));
    }

    #[test]
    fn non_string_event_name_is_rejected() {
        assert_eq!(decode_text(r#"42[3,"x"]"#), Err(DecodeError::EmptyOrNotArray));
    }

    #[test]
    fn truncated_json_is_malformed_not_a_panic() {
        assert!(matches!(
            decode_text("3[notjson"),
            Err(DecodeError::MalformedJson(_))
        ));
    }

    #[test]
    fn multi_digit_prefix_is_stripped() {
        let msg = decode_text(r#"451["volatile",1]"#).unwrap();
        assert_eq!(msg.event_name, "volatile");
        assert_eq!(msg.payload, Some(json!(1)));
    }
}
