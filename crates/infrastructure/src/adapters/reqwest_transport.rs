//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. It writes the
//! normalized request onto a `reqwest::Client`, streams the body in
//! both directions so progress callbacks can fire, and classifies
//! reqwest failures into the port's error taxonomy. Cancellation is
//! not handled here: the dispatcher drops the returned future, which
//! aborts the in-flight exchange.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Method};

use courier_application::{
    ProgressEvent, ProgressHandler, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use courier_domain::{HeaderMap, HttpMethod, Payload, ResponseType};

/// Transport adapter wrapping `reqwest::Client`.
///
/// Default configuration:
/// - Follow redirects: up to 10
/// - TLS verification: enabled
/// - User-Agent: "courier/0.1.0"
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates the adapter with default client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("courier/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
                code: None,
            })?;

        Ok(Self { client })
    }

    /// Creates the adapter around a custom client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts the domain method to a reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Selects the header pairs actually written to the wire:
    /// mapping order is kept, suppressed (unset) values are skipped,
    /// and `Content-Type` is skipped when there is no body.
    fn outgoing_headers(headers: &HeaderMap, body: &Payload) -> Vec<(String, String)> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value?;
                if body.is_none() && name.eq_ignore_ascii_case("content-type") {
                    return None;
                }
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Chunked byte stream reporting cumulative progress to the
    /// handler as each chunk is yielded.
    fn progress_chunks(
        bytes: Vec<u8>,
        handler: ProgressHandler,
    ) -> impl futures_util::Stream<Item = Result<Bytes, std::convert::Infallible>> {
        const CHUNK: usize = 16 * 1024;

        let total = bytes.len() as u64;
        let chunks: Vec<Bytes> = bytes.chunks(CHUNK).map(Bytes::copy_from_slice).collect();
        let mut loaded = 0u64;
        futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            loaded += chunk.len() as u64;
            handler(ProgressEvent {
                loaded,
                total: Some(total),
            });
            Ok(chunk)
        }))
    }

    /// Wraps raw bytes into a request body, chunked so the upload
    /// progress handler sees the transfer advance. Without a handler
    /// the bytes go out as one plain body.
    fn upload_body(bytes: Vec<u8>, handler: Option<ProgressHandler>) -> reqwest::Body {
        match handler {
            None => reqwest::Body::from(bytes),
            Some(handler) => reqwest::Body::wrap_stream(Self::progress_chunks(bytes, handler)),
        }
    }

    /// Attaches the transformed body to the request builder.
    fn attach_body(
        builder: reqwest::RequestBuilder,
        body: Payload,
        on_upload_progress: Option<ProgressHandler>,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match body {
            Payload::None => Ok(builder),
            Payload::Text(text) => {
                Ok(builder.body(Self::upload_body(text.into_bytes(), on_upload_progress)))
            }
            Payload::Bytes(bytes) => {
                Ok(builder.body(Self::upload_body(bytes, on_upload_progress)))
            }
            // Normally serialized by the transform chain already; kept
            // as a fallback for callers bypassing the default chain.
            Payload::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| TransportError::Network {
                    message: format!("failed to serialize JSON body: {e}"),
                    code: None,
                })?;
                Ok(builder.body(Self::upload_body(bytes, on_upload_progress)))
            }
            Payload::Form(pairs) => {
                let encoded =
                    serde_urlencoded::to_string(&pairs).map_err(|e| TransportError::Network {
                        message: format!("failed to encode form body: {e}"),
                        code: None,
                    })?;
                Ok(builder.body(Self::upload_body(encoded.into_bytes(), on_upload_progress)))
            }
            Payload::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let mut piece = reqwest::multipart::Part::bytes(part.data);
                    if let Some(filename) = part.filename {
                        piece = piece.file_name(filename);
                    }
                    if let Some(content_type) = part.content_type {
                        piece =
                            piece
                                .mime_str(&content_type)
                                .map_err(|e| TransportError::Network {
                                    message: format!("invalid part content type: {e}"),
                                    code: None,
                                })?;
                    }
                    form = form.part(part.name, piece);
                }
                Ok(builder.multipart(form))
            }
        }
    }

    /// Classifies reqwest errors into the port taxonomy.
    fn map_error(error: reqwest::Error, timeout: std::time::Duration) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout };
        }

        let code = if error.is_connect() {
            Some("ECONNREFUSED".to_string())
        } else {
            None
        };
        TransportError::Network {
            message: error.to_string(),
            code,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url =
            reqwest::Url::parse(&request.url).map_err(|e| TransportError::Network {
                message: format!("invalid URL {}: {e}", request.url),
                code: None,
            })?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        if !request.timeout.is_zero() {
            builder = builder.timeout(request.timeout);
        }

        // Headers go on one at a time, in mapping order. Credential
        // sharing is a cookie-jar concern of the injected client; the
        // flag only drives XSRF injection upstream.
        for (name, value) in Self::outgoing_headers(&request.headers, &request.body) {
            builder = builder.header(name, value);
        }

        builder = Self::attach_body(builder, request.body, request.on_upload_progress)?;

        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, request.timeout))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        let handle = Some(response.url().to_string());
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let total = response.content_length();
        let mut body_stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut loaded = 0u64;
        while let Some(chunk) = body_stream.next().await {
            let chunk = chunk.map_err(|e| Self::map_error(e, request.timeout))?;
            loaded += chunk.len() as u64;
            if let Some(handler) = &request.on_download_progress {
                handler(ProgressEvent { loaded, total });
            }
            buffer.extend_from_slice(&chunk);
        }

        let body = match request.response_type {
            ResponseType::Binary => Payload::Bytes(buffer),
            ResponseType::Text | ResponseType::Json => match String::from_utf8(buffer) {
                Ok(text) if !text.is_empty() => Payload::Text(text),
                Ok(_) => Payload::None,
                Err(invalid) => Payload::Bytes(invalid.into_bytes()),
            },
        };

        tracing::debug!(status, "request completed");

        Ok(TransportResponse {
            status,
            status_text,
            headers,
            body,
            handle,
        })
    }
}
