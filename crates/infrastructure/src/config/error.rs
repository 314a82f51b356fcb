//! Configuration errors

use thiserror::Error;

/// Errors raised while loading or validating the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No token is configured and the credentials are incomplete.
    #[error("set access_token, or both user_name and password")]
    MissingCredentials,

    /// A value is out of range.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key.
        key: &'static str,
        /// Why it was rejected.
        message: String,
    },
}
