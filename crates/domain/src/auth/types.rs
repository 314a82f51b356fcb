//! Authentication types: bearer tokens and login credentials.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the session's token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// A pre-provisioned token supplied by configuration.
    Configured,
    /// A token issued by `POST /User/Login` during bootstrap.
    Login,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => f.write_str("configured token"),
            Self::Login => f.write_str("login"),
        }
    }
}

/// Bearer token attached to every request of a session.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    source: TokenSource,
    obtained_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token from `raw`, returning `None` when it is empty or whitespace.
    #[must_use]
    pub fn parse(raw: &str, source: TokenSource) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            value: value.to_string(),
            source,
            obtained_at: Utc::now(),
        })
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns where the token came from.
    #[must_use]
    pub const fn source(&self) -> TokenSource {
        self.source
    }

    /// Returns when the token was resolved.
    #[must_use]
    pub const fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// User name and password used when no token is configured.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account user name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rejects_blank() {
        assert!(AccessToken::parse("", TokenSource::Configured).is_none());
        assert!(AccessToken::parse("   ", TokenSource::Login).is_none());
    }

    #[test]
    fn test_parse_trims() {
        let token = AccessToken::parse("  abc.def  ", TokenSource::Login).unwrap();
        assert_eq!(token.as_str(), "abc.def");
        assert_eq!(token.source(), TokenSource::Login);
        assert_eq!(token.authorization_header(), "Bearer abc.def");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = AccessToken::parse("super-secret", TokenSource::Configured).unwrap();
        assert!(!format!("{token:?}").contains("super-secret"));

        let credentials = Credentials::new("reader", "hunter2");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("reader"));
        assert!(!printed.contains("hunter2"));
    }
}
