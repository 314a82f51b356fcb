//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod http_client;
mod verifier;

pub use http_client::{HttpClient, HttpClientError, HttpFuture};
pub use verifier::ResponseVerifier;
