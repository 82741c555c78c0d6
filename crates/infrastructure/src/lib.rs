//! Courier Infrastructure - Transport adapters
//!
//! Network-facing implementations of the application-layer ports.
//! Currently one adapter: [`ReqwestTransport`], which drives a single
//! HTTP exchange through `reqwest`.

pub mod adapters;

pub use adapters::ReqwestTransport;
