//! Baseline request configuration
//!
//! Mirrors the conventional client defaults: an `Accept` header for
//! every method, a form-urlencoded `Content-Type` for the body-bearing
//! methods, the standard XSRF cookie/header names, the default
//! transform chains and a validator accepting 2xx and 3xx statuses.

use std::sync::Arc;

use courier_domain::{HeaderBuckets, HttpMethod};

use crate::config::{RequestConfig, StatusValidator};
use crate::transform::{self, Transformer};

/// Builds the baseline configuration callers merge their own settings
/// over.
#[must_use]
pub fn config() -> RequestConfig {
    let mut headers = HeaderBuckets::new();
    headers
        .common
        .set("Accept", "application/json, text/plain, */*");
    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch] {
        headers
            .for_method(method)
            .set("Content-Type", "application/x-www-form-urlencoded");
    }

    RequestConfig {
        headers,
        xsrf_cookie_name: Some("XSRF-TOKEN".to_string()),
        xsrf_header_name: Some("X-XSRF-TOKEN".to_string()),
        validate_status: Some(validate_status()),
        transform_request: request_transformers(),
        transform_response: response_transformers(),
        ..RequestConfig::default()
    }
}

/// The default status validator: successful and redirect statuses
/// count as success.
#[must_use]
pub fn validate_status() -> StatusValidator {
    Arc::new(|status| (200..400).contains(&status))
}

/// The default outgoing transform chain.
#[must_use]
pub fn request_transformers() -> Vec<Transformer> {
    vec![Arc::new(transform::default_request) as Transformer]
}

/// The default incoming transform chain.
#[must_use]
pub fn response_transformers() -> Vec<Transformer> {
    vec![Arc::new(transform::default_response) as Transformer]
}
