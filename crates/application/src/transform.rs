//! Payload transform chains
//!
//! A transform chain is an ordered list of functions applied to a
//! body, each receiving the header mapping by mutable reference so it
//! can adjust headers alongside the data (typically `Content-Type`).

use std::sync::Arc;

use courier_domain::{HeaderMap, Payload};

/// One step of a transform chain.
pub type Transformer = Arc<dyn Fn(Payload, &mut HeaderMap) -> Payload + Send + Sync>;

/// Applies a chain of transformers in order, threading the result of
/// one into the next.
#[must_use]
pub fn apply(data: Payload, headers: &mut HeaderMap, transformers: &[Transformer]) -> Payload {
    transformers
        .iter()
        .fold(data, |data, transformer| transformer(data, headers))
}

/// Default outgoing transformer.
///
/// Structured JSON payloads serialize to a JSON string, form payloads
/// to a URL-encoded string; each sets its content type unless one is
/// already present. Everything else passes through untouched.
#[must_use]
pub fn default_request(data: Payload, headers: &mut HeaderMap) -> Payload {
    match data {
        Payload::Json(value) => {
            if headers.get("Content-Type").is_none() {
                headers.set("Content-Type", "application/json;charset=utf-8");
            }
            match serde_json::to_string(&value) {
                Ok(text) => Payload::Text(text),
                Err(_) => Payload::Json(value),
            }
        }
        Payload::Form(pairs) => {
            if headers.get("Content-Type").is_none() {
                headers.set("Content-Type", "application/x-www-form-urlencoded");
            }
            match serde_urlencoded::to_string(&pairs) {
                Ok(text) => Payload::Text(text),
                Err(_) => Payload::Form(pairs),
            }
        }
        other => other,
    }
}

/// Default incoming transformer.
///
/// Textual bodies get a best-effort JSON parse; on failure the
/// original text is kept without raising. Non-textual bodies pass
/// through untouched.
#[must_use]
pub fn default_response(data: Payload, _headers: &mut HeaderMap) -> Payload {
    match data {
        Payload::Text(text) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        },
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_serializes_json_and_sets_content_type() {
        let mut headers = HeaderMap::new();
        let out = default_request(Payload::Json(json!({"a": 1})), &mut headers);

        assert_eq!(out, Payload::Text(r#"{"a":1}"#.to_string()));
        assert_eq!(
            headers.get("content-type"),
            Some("application/json;charset=utf-8")
        );
    }

    #[test]
    fn test_request_respects_existing_content_type() {
        let mut headers = HeaderMap::new();
        headers.set("Content-Type", "application/vnd.api+json");
        default_request(Payload::Json(json!({})), &mut headers);
        assert_eq!(headers.get("content-type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_request_serializes_form_pairs() {
        let mut headers = HeaderMap::new();
        let pairs = vec![
            ("name".to_string(), "Jean Doe".to_string()),
            ("age".to_string(), "42".to_string()),
        ];
        let out = default_request(Payload::Form(pairs), &mut headers);

        assert_eq!(out, Payload::Text("name=Jean+Doe&age=42".to_string()));
        assert_eq!(
            headers.get("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_request_passes_text_through() {
        let mut headers = HeaderMap::new();
        let out = default_request(Payload::from("raw"), &mut headers);
        assert_eq!(out, Payload::from("raw"));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_response_parses_json_text() {
        let mut headers = HeaderMap::new();
        let out = default_response(Payload::from(r#"{"ok":true}"#), &mut headers);
        assert_eq!(out, Payload::Json(json!({"ok": true})));
    }

    #[test]
    fn test_response_keeps_non_json_text() {
        let mut headers = HeaderMap::new();
        let out = default_response(Payload::from("plain text, not json"), &mut headers);
        assert_eq!(out, Payload::from("plain text, not json"));
    }

    #[test]
    fn test_response_passes_bytes_through() {
        let mut headers = HeaderMap::new();
        let out = default_response(Payload::Bytes(vec![0, 159]), &mut headers);
        assert_eq!(out, Payload::Bytes(vec![0, 159]));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let original = json!({"user": {"name": "ada", "tags": ["a", "b"]}, "n": 3});
        let mut headers = HeaderMap::new();

        let wire = default_request(Payload::Json(original.clone()), &mut headers);
        let back = default_response(wire, &mut headers);

        assert_eq!(back, Payload::Json(original));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let upper: Transformer = Arc::new(|data, _headers: &mut HeaderMap| match data {
            Payload::Text(text) => Payload::Text(text.to_uppercase()),
            other => other,
        });
        let suffix: Transformer = Arc::new(|data, _headers: &mut HeaderMap| match data {
            Payload::Text(text) => Payload::Text(format!("{text}!")),
            other => other,
        });

        let mut headers = HeaderMap::new();
        let out = apply(Payload::from("hey"), &mut headers, &[upper, suffix]);
        assert_eq!(out, Payload::from("HEY!"));
    }
}
