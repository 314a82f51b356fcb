//! Storycheck Application - Use cases and ports
//!
//! This crate holds the run orchestration of the Story API test runner:
//! the ports adapters must implement, session bootstrap and the use case
//! that executes a case plan.

pub mod error;
pub mod ports;
pub mod session;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::{ApplicationError, ApplicationResult, AuthenticationError};
pub use ports::{HttpClient, HttpClientError, HttpFuture, ResponseVerifier};
pub use session::{Session, SessionSettings, SessionSummary, login};
pub use use_cases::RunStorySuite;
