//! Application error types

use storycheck_domain::DomainError;
use thiserror::Error;

use crate::ports::HttpClientError;

/// Session bootstrap failures. Any of these aborts the run before a case executes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Neither a token nor credentials were configured.
    #[error("no access token configured and no credentials to log in with")]
    NoCredentials,

    /// The login endpoint answered with a non-200 status.
    #[error("failed to authenticate: status {status}, body: {body}")]
    LoginRejected {
        /// Status code returned by the login endpoint.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The login succeeded but carried no usable `accessToken`.
    #[error("failed to retrieve token from the login response")]
    MissingToken,

    /// The login body was not the expected JSON.
    #[error("malformed login response: {0}")]
    MalformedLoginResponse(String),

    /// The login request could not be built.
    #[error("could not build login request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// The login request never produced a response.
    #[error("login request failed: {0}")]
    Transport(#[from] HttpClientError),
}

/// Application-level errors. A run only fails as a whole when its session
/// cannot be opened; case failures are recorded in the report instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Session bootstrap failed.
    #[error("authentication error: {0}")]
    Authentication(#[from] AuthenticationError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
