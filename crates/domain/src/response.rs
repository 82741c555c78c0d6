//! Response types

use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;
use crate::method::HttpMethod;
use crate::payload::Payload;

/// Hint for how the transport should deliver the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Deliver the body as text (the default).
    #[default]
    Text,
    /// Deliver the body as text; parsing happens in the transform
    /// chain, so this behaves like [`Self::Text`] at the transport.
    Json,
    /// Deliver the body as raw bytes.
    Binary,
}

/// The method and final URL of the request that produced a response
/// or error. Kept instead of the full configuration so responses and
/// errors stay cheap to clone and inspect; the outgoing headers and
/// body are not retained, so for failure diagnostics look at the
/// error's message and, for status failures, its attached response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Resolved HTTP method.
    pub method: HttpMethod,
    /// Final URL handed to the transport.
    pub url: String,
}

impl RequestContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }
}

/// A normalized HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response body, after the response transform chain on success.
    pub data: Payload,
    /// Numeric status code.
    pub status: u16,
    /// Status text (e.g. "OK", "Not Found").
    pub status_text: String,
    /// Response headers with lower-cased names and trimmed values.
    pub headers: HeaderMap,
    /// The originating request.
    pub context: RequestContext,
    /// Opaque identifier of the underlying transport exchange, for
    /// introspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl Response {
    /// Builds a response, normalizing raw header pairs: names are
    /// lower-cased, values trimmed, duplicates collapse to the last
    /// occurrence.
    #[must_use]
    pub fn new(
        data: Payload,
        status: u16,
        status_text: impl Into<String>,
        raw_headers: impl IntoIterator<Item = (String, String)>,
        context: RequestContext,
    ) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in raw_headers {
            headers.set(name.to_ascii_lowercase(), value.trim().to_string());
        }
        Self {
            data,
            status,
            status_text: status_text.into(),
            headers,
            context,
            handle: None,
        }
    }
}
