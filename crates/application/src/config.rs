//! Request configuration
//!
//! One [`RequestConfig`] is created per call, mutated in place by the
//! normalization stages and discarded once the dispatch settles.
//! Defaults merging happens outside the pipeline; see
//! [`defaults`](crate::defaults) for the baseline values.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use courier_domain::{
    BasicAuth, HeaderBuckets, HttpMethod, Payload, QueryParams, RequestContext, ResponseType,
};

use crate::cancel::CancelToken;
use crate::ports::ProgressHandler;
use crate::transform::Transformer;

/// Predicate deciding which status codes count as success.
pub type StatusValidator = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Custom query-parameter serializer, shared form of
/// [`courier_domain::ParamsSerializer`].
pub type ParamsSerializerFn = Arc<dyn Fn(&QueryParams) -> String + Send + Sync>;

/// Declarative configuration of one request.
#[derive(Clone, Default)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL, relative or absolute.
    pub url: String,
    /// Base URL prepended to relative targets.
    pub base_url: Option<String>,
    /// Query parameters to serialize onto the URL.
    pub params: QueryParams,
    /// Custom parameter serializer; replaces the built-in one.
    pub params_serializer: Option<ParamsSerializerFn>,
    /// Headers, partitioned into common and per-method buckets.
    pub headers: HeaderBuckets,
    /// Outgoing body.
    pub data: Payload,
    /// Timeout for the exchange; zero means none.
    pub timeout: Duration,
    /// Response body delivery hint.
    pub response_type: ResponseType,
    /// Whether credentials are shared with cross-site targets.
    pub with_credentials: bool,
    /// Basic-auth credentials.
    pub auth: Option<BasicAuth>,
    /// Name of the cookie carrying the cross-site request forgery
    /// token.
    pub xsrf_cookie_name: Option<String>,
    /// Header under which the forgery token is sent.
    pub xsrf_header_name: Option<String>,
    /// Upload progress callback.
    pub on_upload_progress: Option<ProgressHandler>,
    /// Download progress callback.
    pub on_download_progress: Option<ProgressHandler>,
    /// Status validator; `None` accepts every status.
    pub validate_status: Option<StatusValidator>,
    /// Cooperative cancellation token.
    pub cancel_token: Option<CancelToken>,
    /// Transform chain for the outgoing body.
    pub transform_request: Vec<Transformer>,
    /// Transform chain for the incoming body.
    pub transform_response: Vec<Transformer>,
}

impl RequestConfig {
    /// Creates a bare configuration for a method and URL.
    ///
    /// No defaults are applied; see [`defaults::config`]
    /// (crate::defaults::config) for the usual baseline.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns the method and current URL as a [`RequestContext`].
    #[must_use]
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.method, self.url.clone())
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("timeout", &self.timeout)
            .field("response_type", &self.response_type)
            .field("with_credentials", &self.with_credentials)
            .field("auth", &self.auth)
            .field("xsrf_cookie_name", &self.xsrf_cookie_name)
            .field("xsrf_header_name", &self.xsrf_header_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_sets_method_and_url() {
        let config = RequestConfig::new(HttpMethod::Post, "/users");
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.url, "/users");
        assert!(config.data.is_none());
        assert!(config.cancel_token.is_none());
    }

    #[test]
    fn test_debug_omits_callbacks() {
        let config = RequestConfig::new(HttpMethod::Get, "/x");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("method"));
        assert!(!rendered.contains("on_upload_progress"));
    }
}
