//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A response body could not be decoded into the expected shape.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),

    /// A case needs state that no earlier case produced.
    #[error("missing run state: {0}")]
    MissingState(String),

    /// The case plan is malformed.
    #[error("invalid case plan: {0}")]
    InvalidPlan(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
