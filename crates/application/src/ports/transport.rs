//! Transport port
//!
//! Abstracts the network primitive that performs one HTTP exchange.
//! The dispatcher builds a fully-normalized [`TransportRequest`], the
//! adapter returns either a raw response or a classified
//! [`TransportError`]. Cancellation is handled above this boundary:
//! when the dispatcher drops the execute future, the adapter must
//! abort the underlying call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_domain::{HeaderMap, HttpMethod, Payload, ResponseType};

/// A progress notification from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes expected, when known.
    pub total: Option<u64>,
}

/// Callback invoked with upload or download progress events.
///
/// Progress never affects settlement of the request.
pub type ProgressHandler = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// A fully-normalized request, ready to be written to the wire.
///
/// Headers arrive flattened and in final mapping order; entries whose
/// value is unset must be skipped when writing, as must
/// `Content-Type` when there is no body.
#[derive(Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Final URL including serialized query parameters.
    pub url: String,
    /// Flattened header mapping.
    pub headers: HeaderMap,
    /// Transformed outgoing body.
    pub body: Payload,
    /// Timeout for the whole exchange; zero means no timeout.
    pub timeout: Duration,
    /// Response body delivery hint.
    pub response_type: ResponseType,
    /// Whether credentials are shared with cross-site targets.
    pub with_credentials: bool,
    /// Upload progress callback.
    pub on_upload_progress: Option<ProgressHandler>,
    /// Download progress callback.
    pub on_download_progress: Option<ProgressHandler>,
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("response_type", &self.response_type)
            .field("with_credentials", &self.with_credentials)
            .finish_non_exhaustive()
    }
}

/// The raw result of one transport exchange, before normalization.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Numeric status code (non-zero).
    pub status: u16,
    /// Status text as reported by the transport.
    pub status_text: String,
    /// Response headers as received, un-normalized.
    pub headers: Vec<(String, String)>,
    /// Response body, shaped per the requested response type.
    pub body: Payload,
    /// Opaque identifier of the exchange, for introspection.
    pub handle: Option<String>,
}

/// Failures the transport can classify on its own.
///
/// Status validation is not the transport's concern; a received
/// response is always returned as [`TransportResponse`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// No response could be obtained (connectivity, DNS, TLS...).
    #[error("network error: {message}")]
    Network {
        /// Human-readable failure description.
        message: String,
        /// Transport-level code, when one applies.
        code: Option<String>,
    },
    /// The configured timeout elapsed before completion.
    #[error("timeout of {} ms exceeded", timeout.as_millis())]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the network implementation, keeping the
/// dispatch pipeline independent of any specific HTTP library.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response can be obtained
    /// or the timeout elapses.
    async fn execute(&self, request: TransportRequest)
    -> Result<TransportResponse, TransportError>;
}
