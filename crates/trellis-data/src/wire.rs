//! Tagged value-or-error envelope shared by the server and the client cache.
//!
//! ```text
//! {"t":"value","v":<payload>}
//! {"t":"error","e":{"name":"..","message":"..","data":..,"cause":{..}}}
//! ```
//!
//! The receiver gets back either the payload or a [`WireError`]; it never
//! needs to know the sender's concrete error type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Portable description of an error raised on the other side of the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{name}: {message}")]
pub struct WireError {
    /// Error kind, e.g. `LoaderError`.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Application-specific structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Underlying error, outermost first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<WireError>>,
}

impl WireError {
    /// Create a new wire error.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            data: None,
            cause: None,
        }
    }

    /// Generic error used when details must not leave the server.
    pub fn invariant() -> Self {
        Self::new("Error", "invariant")
    }

    /// Attach structured details.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach an underlying cause.
    pub fn with_cause(mut self, cause: WireError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Capture an error and its whole `source()` chain.
    pub fn from_error(name: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut wire = Self::new(name, error.to_string());
        if let Some(source) = error.source() {
            wire.cause = Some(Box::new(Self::from_error("Error", source)));
        }
        wire
    }

    /// Iterate over this error and its causes.
    pub fn chain(&self) -> impl Iterator<Item = &WireError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }
}

/// Encoding or decoding failure of the envelope itself.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "lowercase")]
enum Envelope<T> {
    Value { v: T },
    Error { e: WireError },
}

/// Encode a successful payload.
pub fn encode_value<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(&Envelope::Value { v: value }).map_err(CodecError::Encode)
}

/// Encode an error payload.
pub fn encode_error(error: &WireError) -> Result<String, CodecError> {
    serde_json::to_string(&Envelope::<()>::Error { e: error.clone() }).map_err(CodecError::Encode)
}

/// Decode an envelope into either the payload or the transported error.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<Result<T, WireError>, CodecError> {
    match serde_json::from_str::<Envelope<T>>(text).map_err(CodecError::Decode)? {
        Envelope::Value { v } => Ok(Ok(v)),
        Envelope::Error { e } => Ok(Err(e)),
    }
}

/// Make encoded JSON safe to inline inside a `<script>` element.
pub fn script_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{LoadResult, LoaderResultSet};

    #[test]
    fn test_value_envelope_shape() {
        let text = encode_value(&LoadResult::props(json!({ "id": "42" }))).unwrap();
        assert_eq!(text, r#"{"t":"value","v":{"props":{"id":"42"}}}"#);
    }

    #[test]
    fn test_result_set_round_trip() {
        let set = LoaderResultSet::new(vec![
            LoadResult::empty(),
            LoadResult::props(json!({
                "list": [1, 2.5, "three", null, { "deep": [true] }],
                "nested": { "name": "ValidationError", "message": "bad input" }
            })),
        ]);

        let text = encode_value(&set).unwrap();
        let back: LoaderResultSet = decode(&text).unwrap().unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_error_round_trip_keeps_cause_chain() {
        let error = WireError::new("LoaderError", "users/[id] failed")
            .with_data(json!({ "route": "users/[id]" }))
            .with_cause(WireError::new("Error", "connection refused"));

        let text = encode_error(&error).unwrap();
        let decoded = decode::<LoadResult>(&text).unwrap();

        assert_eq!(decoded, Err(error));
    }

    #[test]
    fn test_from_error_walks_sources() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        let wire = WireError::from_error("LoaderError", &err);

        let messages: Vec<&str> = wire.chain().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["outer", "inner"]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode::<LoadResult>("<html>"),
            Err(CodecError::Decode(_))
        ));
        assert!(decode::<LoadResult>(r#"{"t":"other"}"#).is_err());
    }

    #[test]
    fn test_script_safe() {
        let text = encode_value(&json!({ "html": "</script><b>&" })).unwrap();
        let safe = script_safe(&text);

        assert!(!safe.contains("</script>"));
        assert!(!safe.contains('<'));
        let back: Value = decode(&safe).unwrap().unwrap();
        assert_eq!(back, json!({ "html": "</script><b>&" }));
    }
}
