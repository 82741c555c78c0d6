//! Courier Application - Request-dispatch pipeline
//!
//! This crate owns the control flow of the Courier HTTP client: it
//! takes a declarative [`RequestConfig`], normalizes URL, headers and
//! body, invokes the transport port while racing the cancellation
//! token and settles with a normalized
//! [`Response`](courier_domain::Response) or a classified [`Error`].
//! Network adapters live in the infrastructure crate behind the
//! [`Transport`] port.

pub mod cancel;
pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod ports;
pub mod transform;

pub use cancel::{CancelToken, Canceller};
pub use config::{ParamsSerializerFn, RequestConfig, StatusValidator};
pub use dispatch::Dispatcher;
pub use error::{Error, ErrorKind};
pub use ports::{
    CookieSource, ProgressEvent, ProgressHandler, Transport, TransportError, TransportRequest,
    TransportResponse,
};
pub use transform::Transformer;
