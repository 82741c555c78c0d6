//! URL construction helpers
//!
//! Builds the final request line: base/relative combination, query
//! string serialization with the relaxed encoding used by query-string
//! conventions, and origin comparison for cross-site checks.

use std::sync::LazyLock;

use chrono::SecondsFormat;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use ::url::Url;

use crate::error::{DomainError, DomainResult};
use crate::params::{ParamValue, QueryParams};

/// Custom serializer for a whole parameter collection.
pub type ParamsSerializer = dyn Fn(&QueryParams) -> String + Send + Sync;

/// Characters escaped in query components. Everything non-alphanumeric
/// except the unreserved marks and `@ : $ , [ ]`, which query-string
/// conventions leave readable. Space is handled separately so it can
/// become `+`.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']')
    .remove(b' ');

#[allow(clippy::expect_used)] // literal pattern
static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z][a-z0-9+.-]*:)?//").expect("absolute-URL pattern is valid")
});

/// Percent-encodes one query component with the relaxed set, mapping
/// spaces to `+`.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_SET)
        .to_string()
        .replace(' ', "+")
}

fn render_scalar(value: &ParamValue) -> Option<String> {
    match value {
        ParamValue::Null | ParamValue::List(_) => None,
        ParamValue::Bool(b) => Some(b.to_string()),
        ParamValue::Int(i) => Some(i.to_string()),
        ParamValue::Float(f) => Some(f.to_string()),
        ParamValue::Text(s) => Some(s.clone()),
        ParamValue::Date(d) => Some(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ParamValue::Object(v) => serde_json::to_string(v).ok(),
    }
}

/// Serializes parameters into `key=value&...` form.
///
/// Null-valued entries are skipped, list values expand to one
/// `key[]=element` pair per element and the remaining order follows
/// the collection's insertion order.
#[must_use]
pub fn serialize_params(params: &QueryParams) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (key, value) in params.iter() {
        match value {
            ParamValue::Null => {}
            ParamValue::List(items) => {
                let key = format!("{key}[]");
                for item in items {
                    if let Some(rendered) = render_scalar(item) {
                        parts.push(format!(
                            "{}={}",
                            encode_component(&key),
                            encode_component(&rendered)
                        ));
                    }
                }
            }
            scalar => {
                if let Some(rendered) = render_scalar(scalar) {
                    parts.push(format!(
                        "{}={}",
                        encode_component(key),
                        encode_component(&rendered)
                    ));
                }
            }
        }
    }
    parts.join("&")
}

/// Appends serialized query parameters to a URL.
///
/// With no parameters the URL is returned unchanged. A custom
/// serializer, when supplied, takes over serialization entirely. Any
/// `#fragment` is stripped before appending, and `?` or `&` is chosen
/// depending on whether the URL already carries a query string.
#[must_use]
pub fn build_url(url: &str, params: &QueryParams, serializer: Option<&ParamsSerializer>) -> String {
    let serialized = match serializer {
        Some(serialize) => serialize(params),
        None if params.is_empty() => String::new(),
        None => serialize_params(params),
    };

    if serialized.is_empty() {
        return url.to_string();
    }

    let base = url.split('#').next().unwrap_or(url);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{serialized}")
}

/// Joins a base URL and a relative path with exactly one `/`.
#[must_use]
pub fn combine_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Returns true if the URL carries a scheme followed by `//`, or is
/// protocol-relative (`//host/...`).
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL.is_match(url)
}

/// The scheme+host identity of an execution context.
///
/// Passed explicitly wherever a same-origin decision is needed; there
/// is no ambient global origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
}

impl Origin {
    /// Parses an origin out of an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] when the URL cannot be
    /// parsed or has no host.
    pub fn parse(url: &str) -> DomainResult<Self> {
        let parsed =
            Url::parse(url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| DomainError::InvalidUrl(format!("no host in {url}")))?;
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
        })
    }
}

/// Compares a request URL against an origin.
///
/// Relative URLs resolve against the current context and are
/// same-origin by definition; absolute URLs must match scheme and
/// host.
#[must_use]
pub fn is_same_origin(url: &str, origin: &Origin) -> bool {
    if !is_absolute_url(url) {
        return true;
    }
    Origin::parse(url).is_ok_and(|parsed| parsed == *origin)
}
