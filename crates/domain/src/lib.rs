//! Courier Domain - Core value types
//!
//! This crate defines the data model for the Courier HTTP client:
//! methods, query parameters, headers, payloads, responses and the
//! URL helpers used to assemble a request line. All types here are
//! pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod headers;
pub mod method;
pub mod params;
pub mod payload;
pub mod response;
pub mod url;

pub use auth::BasicAuth;
pub use error::{DomainError, DomainResult};
pub use headers::{HeaderBuckets, HeaderMap};
pub use method::HttpMethod;
pub use params::{ParamValue, QueryParams};
pub use payload::{Part, Payload};
pub use response::{RequestContext, Response, ResponseType};
pub use url::{
    Origin, ParamsSerializer, build_url, combine_url, is_absolute_url, is_same_origin,
    serialize_params,
};
