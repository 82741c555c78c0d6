//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the dispatch pipeline and
//! external systems. Each port is a trait implemented by adapters in
//! the infrastructure layer.

mod cookies;
mod transport;

pub use cookies::CookieSource;
pub use transport::{
    ProgressEvent, ProgressHandler, Transport, TransportError, TransportRequest,
    TransportResponse,
};
