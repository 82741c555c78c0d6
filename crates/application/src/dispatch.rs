//! Request dispatch
//!
//! Orchestrates one complete client-side handling of a request:
//! cancellation check, URL resolution, header flattening, body
//! transformation, transport invocation and response normalization.
//! Exactly one transport attempt happens per dispatch; the only
//! cross-cutting race is transport completion vs cancellation, and
//! `tokio::select!` guarantees a single settlement.

use std::sync::Arc;

use courier_domain::{
    HeaderMap, Origin, Payload, Response, build_url, combine_url, is_absolute_url, is_same_origin,
};

use crate::config::RequestConfig;
use crate::error::Error;
use crate::ports::{CookieSource, Transport, TransportError, TransportRequest};
use crate::transform;

/// Dispatches requests through a transport.
///
/// Holds the injected collaborators a dispatch needs besides its
/// configuration: the transport itself, an optional cookie source for
/// XSRF injection and the current execution origin for same-origin
/// decisions. There is no ambient global origin; without one, only
/// `with_credentials` enables XSRF injection.
pub struct Dispatcher<T: Transport> {
    transport: Arc<T>,
    cookies: Option<Arc<dyn CookieSource>>,
    origin: Option<Origin>,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher over the given transport.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            cookies: None,
            origin: None,
        }
    }

    /// Attaches a cookie source for XSRF token injection.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Sets the current execution origin used for same-origin checks.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Performs one dispatch: resolves the configuration into a
    /// transport request, races it against the cancellation token and
    /// normalizes the outcome.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Error`]: `Cancelled` when the token
    /// settles first (or had already settled), `Network`/`Timeout` as
    /// classified by the transport, `BadStatus` when the received
    /// response fails the status validator.
    pub async fn dispatch(&self, mut config: RequestConfig) -> Result<Response, Error> {
        if let Some(token) = &config.cancel_token {
            token
                .throw_if_requested()
                .map_err(|error| error.with_context(config.context()))?;
        }

        config.url = resolve_url(&config);
        let context = config.context();

        let mut headers = config.headers.flatten(config.method);
        let data = transform::apply(
            std::mem::take(&mut config.data),
            &mut headers,
            &config.transform_request,
        );
        self.apply_header_side_effects(&mut headers, &data, &config);

        tracing::debug!(method = %context.method, url = %context.url, "dispatching request");

        let request = TransportRequest {
            method: config.method,
            url: config.url.clone(),
            headers,
            body: data,
            timeout: config.timeout,
            response_type: config.response_type,
            with_credentials: config.with_credentials,
            on_upload_progress: config.on_upload_progress.clone(),
            on_download_progress: config.on_download_progress.clone(),
        };

        // First settlement wins; dropping the losing future aborts the
        // in-flight call, so a late completion can never settle twice.
        // A cancellation landing between the check above and this point
        // is still observed here.
        let outcome = match &config.cancel_token {
            Some(token) => tokio::select! {
                result = self.transport.execute(request) => result,
                reason = token.cancelled() => {
                    tracing::debug!(method = %context.method, url = %context.url, "request cancelled");
                    return Err(Error::cancelled(reason).with_context(context));
                }
            },
            None => self.transport.execute(request).await,
        };

        let raw = outcome.map_err(|error| classify(error).with_context(context.clone()))?;

        let mut response = Response::new(raw.body, raw.status, raw.status_text, raw.headers, context);
        response.handle = raw.handle;

        if let Some(validate) = &config.validate_status {
            if !validate(response.status) {
                tracing::warn!(
                    status = response.status,
                    "status validation rejected response"
                );
                return Err(Error::bad_status(response));
            }
        }

        let data = std::mem::take(&mut response.data);
        response.data = transform::apply(data, &mut response.headers, &config.transform_response);
        Ok(response)
    }

    /// Header mutations that depend on the transformed body and the
    /// injected collaborators, in fixed order: multipart content-type
    /// deletion, XSRF injection, basic auth, empty-body content-type
    /// strip.
    fn apply_header_side_effects(
        &self,
        headers: &mut HeaderMap,
        data: &Payload,
        config: &RequestConfig,
    ) {
        if data.is_multipart() {
            // The transport supplies its own boundary-bearing value.
            headers.remove("Content-Type");
        }

        let same_origin = self
            .origin
            .as_ref()
            .is_some_and(|origin| is_same_origin(&config.url, origin));
        if config.with_credentials || same_origin {
            if let (Some(cookie_name), Some(header_name)) =
                (&config.xsrf_cookie_name, &config.xsrf_header_name)
            {
                if let Some(value) = self
                    .cookies
                    .as_ref()
                    .and_then(|cookies| cookies.get(cookie_name))
                {
                    headers.set(header_name.clone(), value);
                }
            }
        }

        if let Some(auth) = &config.auth {
            headers.set("Authorization", auth.header_value());
        }

        if data.is_none() {
            headers.remove("Content-Type");
        }
    }
}

/// Resolves the final URL: combines the base URL with relative
/// targets, then appends serialized query parameters.
fn resolve_url(config: &RequestConfig) -> String {
    let mut url = config.url.clone();
    if let Some(base) = &config.base_url {
        if !is_absolute_url(&url) {
            url = combine_url(base, &url);
        }
    }
    build_url(&url, &config.params, config.params_serializer.as_deref())
}

fn classify(error: TransportError) -> Error {
    match error {
        TransportError::Network { message, code } => Error::network(message, code),
        TransportError::Timeout { timeout } => Error::timeout(timeout),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use courier_domain::{HttpMethod, QueryParams};
    use pretty_assertions::assert_eq;

    use crate::cancel::CancelToken;
    use crate::defaults;
    use crate::ports::TransportResponse;

    /// Mock transport recording invocations and the last request.
    struct MockTransport {
        calls: AtomicUsize,
        last_request: Mutex<Option<TransportRequest>>,
        result: Mutex<Result<TransportResponse, TransportError>>,
    }

    impl MockTransport {
        fn with_status(status: u16, body: Payload) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                result: Mutex::new(Ok(TransportResponse {
                    status,
                    status_text: String::new(),
                    headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                    body,
                    handle: None,
                })),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                result: Mutex::new(Err(error)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> TransportRequest {
            self.last_request.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            self.result.lock().unwrap().clone()
        }
    }

    fn config_with_defaults(method: HttpMethod, url: &str) -> RequestConfig {
        RequestConfig {
            method,
            url: url.to_string(),
            ..defaults::config()
        }
    }

    #[tokio::test]
    async fn test_success_resolves_with_transformed_body() {
        let transport = Arc::new(MockTransport::with_status(
            200,
            Payload::from(r#"{"id": 7}"#),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let response = dispatcher
            .dispatch(config_with_defaults(HttpMethod::Get, "https://api.test/u"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.data, Payload::Json(serde_json::json!({"id": 7})));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_content_status_resolves() {
        let transport = Arc::new(MockTransport::with_status(204, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let response = dispatcher
            .dispatch(config_with_defaults(HttpMethod::Delete, "https://api.test/u/1"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_rejected_status_carries_response() {
        let transport = Arc::new(MockTransport::with_status(
            404,
            Payload::from(r#"{"error":"missing"}"#),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let error = dispatcher
            .dispatch(config_with_defaults(HttpMethod::Get, "https://api.test/u/9"))
            .await
            .unwrap_err();

        assert_eq!(error.kind, crate::ErrorKind::BadStatus);
        let response = error.response.unwrap();
        assert_eq!(response.status, 404);
        // The failed response keeps its untransformed body.
        assert_eq!(response.data, Payload::from(r#"{"error":"missing"}"#));
    }

    #[tokio::test]
    async fn test_absent_validator_accepts_any_status() {
        let transport = Arc::new(MockTransport::with_status(500, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let mut config = config_with_defaults(HttpMethod::Get, "https://api.test/x");
        config.validate_status = None;

        let response = dispatcher.dispatch(config).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_transport() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let (token, canceller) = CancelToken::source();
        canceller.cancel("changed my mind");

        let mut config = config_with_defaults(HttpMethod::Get, "https://api.test/x");
        config.cancel_token = Some(token);

        let error = dispatcher.dispatch(config).await.unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(error.message, "changed my mind");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_is_classified() {
        let transport = Arc::new(MockTransport::failing(TransportError::Network {
            message: "connection refused".to_string(),
            code: None,
        }));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let error = dispatcher
            .dispatch(config_with_defaults(HttpMethod::Get, "https://api.test/x"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::Network);
        assert_eq!(error.context.unwrap().url, "https://api.test/x");
    }

    #[tokio::test]
    async fn test_timeout_failure_keeps_duration_message() {
        let timeout = std::time::Duration::from_millis(750);
        let transport = Arc::new(MockTransport::failing(TransportError::Timeout { timeout }));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let error = dispatcher
            .dispatch(config_with_defaults(HttpMethod::Get, "https://api.test/x"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::Timeout);
        assert_eq!(error.message, "timeout of 750 ms exceeded");
    }

    #[tokio::test]
    async fn test_url_resolution_combines_base_and_params() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let mut params = QueryParams::new();
        params.add("page", 2);
        let mut config = config_with_defaults(HttpMethod::Get, "/users/");
        config.base_url = Some("https://api.test/v1/".to_string());
        config.url = "users".to_string();
        config.params = params;

        dispatcher.dispatch(config).await.unwrap();
        assert_eq!(
            transport.last_request().url,
            "https://api.test/v1/users?page=2"
        );
    }

    #[tokio::test]
    async fn test_absolute_url_ignores_base() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let mut config = config_with_defaults(HttpMethod::Get, "https://other.test/x");
        config.base_url = Some("https://api.test".to_string());

        dispatcher.dispatch(config).await.unwrap();
        assert_eq!(transport.last_request().url, "https://other.test/x");
    }

    #[tokio::test]
    async fn test_json_body_serialized_with_content_type() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let mut config = config_with_defaults(HttpMethod::Post, "https://api.test/u");
        config.data = Payload::Json(serde_json::json!({"name": "ada"}));

        dispatcher.dispatch(config).await.unwrap();
        let sent = transport.last_request();
        assert_eq!(sent.body, Payload::Text(r#"{"name":"ada"}"#.to_string()));
        // The default POST bucket already carried a Content-Type, so
        // the transformer leaves it alone.
        assert_eq!(
            sent.headers.get("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn test_empty_body_strips_content_type() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        // POST default bucket sets Content-Type, but there is no body.
        let config = config_with_defaults(HttpMethod::Post, "https://api.test/ping");
        dispatcher.dispatch(config).await.unwrap();

        assert_eq!(transport.last_request().headers.get("content-type"), None);
    }

    #[tokio::test]
    async fn test_basic_auth_sets_authorization_header() {
        let transport = Arc::new(MockTransport::with_status(200, Payload::None));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));

        let mut config = config_with_defaults(HttpMethod::Get, "https://api.test/secure");
        config.auth = Some(courier_domain::BasicAuth::new("user", "pass"));

        dispatcher.dispatch(config).await.unwrap();
        assert_eq!(
            transport.last_request().headers.get("authorization"),
            Some("Basic dXNlcjpwYXNz")
        );
    }
}
