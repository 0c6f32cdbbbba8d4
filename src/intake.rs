//! Inbound webhook body parsing.
//!
//! Alerting services send the alert body either as proper JSON, as JSON
//! typed into a plain-text message, or as free text. The stages below are
//! tried in order and the first one that yields a payload wins:
//!
//! 1. the request declares a JSON content type and the body is a JSON object;
//! 2. the body text is a JSON object, or a JSON string that contains one;
//! 3. the body text is wrapped under [`RAW_MESSAGE_KEY`].

use crate::core::{SignalPayload, RAW_MESSAGE_KEY};
use serde_json::Value;

/// The result of running a request body through the parsing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// No usable data: empty body or an empty JSON object.
    Empty,
    Json(SignalPayload),
    JsonText(SignalPayload),
    RawText(SignalPayload),
}

impl ParsedBody {
    /// Short name of the stage that produced the payload.
    pub fn source(&self) -> &'static str {
        match self {
            ParsedBody::Empty => "empty",
            ParsedBody::Json(_) => "json",
            ParsedBody::JsonText(_) => "json_text",
            ParsedBody::RawText(_) => "raw_text",
        }
    }

    pub fn into_payload(self) -> Option<SignalPayload> {
        match self {
            ParsedBody::Empty => None,
            ParsedBody::Json(p) | ParsedBody::JsonText(p) | ParsedBody::RawText(p) => Some(p),
        }
    }
}

/// Runs `body` through the parsing stages.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> ParsedBody {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return ParsedBody::Empty;
    }

    if content_type.is_some_and(is_json_content_type) {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
            return non_empty(map, ParsedBody::Json);
        }
    }

    if let Some(map) = json_object_from_text(&text) {
        return non_empty(map, ParsedBody::JsonText);
    }

    let mut payload = SignalPayload::new();
    payload.insert(RAW_MESSAGE_KEY.to_string(), Value::String(text.into_owned()));
    ParsedBody::RawText(payload)
}

fn json_object_from_text(text: &str) -> Option<SignalPayload> {
    match serde_json::from_str::<Value>(text.trim()).ok()? {
        Value::Object(map) => Some(map),
        Value::String(inner) => match serde_json::from_str::<Value>(inner.trim()).ok()? {
            Value::Object(map) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

fn non_empty(map: SignalPayload, wrap: fn(SignalPayload) -> ParsedBody) -> ParsedBody {
    if map.is_empty() {
        ParsedBody::Empty
    } else {
        wrap(map)
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JSON: Option<&str> = Some("application/json");
    const TEXT: Option<&str> = Some("text/plain; charset=utf-8");

    fn payload(value: Value) -> SignalPayload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_json_body() {
        let parsed = parse_body(JSON, br#"{"action":"ENTRY","price":1}"#);
        assert_eq!(parsed, ParsedBody::Json(payload(json!({"action": "ENTRY", "price": 1}))));
        assert_eq!(parsed.source(), "json");
    }

    #[test]
    fn test_json_content_type_with_parameters() {
        let parsed = parse_body(Some("Application/JSON; charset=utf-8"), br#"{"a":1}"#);
        assert!(matches!(parsed, ParsedBody::Json(_)));
        let parsed = parse_body(Some("application/vnd.alert+json"), br#"{"a":1}"#);
        assert!(matches!(parsed, ParsedBody::Json(_)));
    }

    #[test]
    fn test_json_sent_as_text() {
        let parsed = parse_body(TEXT, b"  {\"symbol\":\"BTCUSDT\"}\n");
        assert_eq!(parsed, ParsedBody::JsonText(payload(json!({"symbol": "BTCUSDT"}))));

        let parsed = parse_body(None, br#"{"symbol":"BTCUSDT"}"#);
        assert_eq!(parsed.source(), "json_text");
    }

    #[test]
    fn test_double_encoded_json() {
        let parsed = parse_body(JSON, br#""{\"action\":\"EXIT\"}""#);
        assert_eq!(parsed, ParsedBody::JsonText(payload(json!({"action": "EXIT"}))));
    }

    #[test]
    fn test_raw_text_is_wrapped() {
        let parsed = parse_body(TEXT, b"BTCUSDT crossed 45000");
        assert_eq!(
            parsed,
            ParsedBody::RawText(payload(json!({"raw_message": "BTCUSDT crossed 45000"})))
        );
    }

    #[test]
    fn test_malformed_json_with_json_content_type_falls_back_to_raw() {
        let parsed = parse_body(JSON, b"{\"action\": ");
        assert_eq!(
            parsed.into_payload(),
            Some(payload(json!({"raw_message": "{\"action\": "})))
        );
    }

    #[test]
    fn test_non_object_json_is_wrapped() {
        let parsed = parse_body(JSON, b"[1, 2, 3]");
        assert_eq!(parsed, ParsedBody::RawText(payload(json!({"raw_message": "[1, 2, 3]"}))));
    }

    #[test]
    fn test_empty_bodies() {
        assert_eq!(parse_body(JSON, b""), ParsedBody::Empty);
        assert_eq!(parse_body(TEXT, b"  \r\n "), ParsedBody::Empty);
        assert_eq!(parse_body(JSON, b"{}"), ParsedBody::Empty);
        assert_eq!(parse_body(TEXT, b"{ }"), ParsedBody::Empty);
        assert_eq!(ParsedBody::Empty.into_payload(), None);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let parsed = parse_body(TEXT, b"price \xff 100");
        assert_eq!(
            parsed.into_payload(),
            Some(payload(json!({"raw_message": "price \u{FFFD} 100"})))
        );
    }
}
