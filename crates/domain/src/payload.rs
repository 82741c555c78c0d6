//! Request and response body payloads

use serde::{Deserialize, Serialize};

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Field name.
    pub name: String,
    /// Optional file name for file parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Optional content type for this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Raw part content.
    pub data: Vec<u8>,
}

impl Part {
    /// Creates a text field part.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }
}

/// A request or response body.
///
/// Bodies keep their logical shape through the transform chain:
/// `Json` values are what the default request transformer serializes,
/// `Text` is what transports deliver for textual responses and `Bytes`
/// carries binary responses untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// No body.
    #[default]
    None,
    /// Textual body.
    Text(String),
    /// Structured JSON body, not yet serialized.
    Json(serde_json::Value),
    /// URL-encoded form fields, not yet serialized.
    Form(Vec<(String, String)>),
    /// Multipart form body. The transport supplies its own
    /// boundary-bearing content type for these.
    Multipart(Vec<Part>),
    /// Raw binary body.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Creates a JSON payload from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error if the value cannot
    /// be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Returns true when there is no body at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true for multipart form bodies.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Returns the textual content, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}
