//! Classified request errors
//!
//! Every failure of a dispatch surfaces as one [`Error`] value tagged
//! with a [`ErrorKind`]. The type itself is the family marker: callers
//! matching on `courier` errors know the failure came from the request
//! pipeline rather than an unrelated bug.

use std::fmt;
use std::time::Duration;

use courier_domain::{RequestContext, Response};

/// Classification of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was obtainable (connectivity, DNS, TLS failure).
    Network,
    /// The configured timeout elapsed before completion.
    Timeout,
    /// A response was received but rejected by the status validator.
    BadStatus,
    /// The cancellation token settled before or during the call.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::BadStatus => "bad status",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// A classified request error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// The originating request, when known.
    pub context: Option<RequestContext>,
    /// Transport-level code (e.g. `ECONNABORTED`), when one applies.
    pub code: Option<String>,
    /// The received response; present only for [`ErrorKind::BadStatus`].
    pub response: Option<Box<Response>>,
}

impl Error {
    /// Builds a network error.
    #[must_use]
    pub fn network(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            context: None,
            code,
            response: None,
        }
    }

    /// Builds a timeout error; the message embeds the configured
    /// duration.
    #[must_use]
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: format!("timeout of {} ms exceeded", timeout.as_millis()),
            context: None,
            code: Some("ECONNABORTED".to_string()),
            response: None,
        }
    }

    /// Builds a status-validation error carrying the full received
    /// response.
    #[must_use]
    pub fn bad_status(response: Response) -> Self {
        Self {
            kind: ErrorKind::BadStatus,
            message: format!("request failed with status code {}", response.status),
            context: Some(response.context.clone()),
            code: None,
            response: Some(Box::new(response)),
        }
    }

    /// Builds a cancellation error carrying the token's reason.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            message: reason.into(),
            context: None,
            code: None,
            response: None,
        }
    }

    /// Attaches the originating request context.
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns true when the request was cancelled via its token.
    ///
    /// This is the caller-facing predicate for telling deliberate
    /// cancellation apart from real failures.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }
}
