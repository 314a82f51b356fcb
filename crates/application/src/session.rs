//! Session bootstrap and teardown.
//!
//! A [`Session`] is the authenticated context of a run: one HTTP client and
//! one bearer token. It is opened once before the first case and closed once
//! after the last; `close` consumes the session so it cannot be reused.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storycheck_domain::plan::LOGIN_PATH;
use storycheck_domain::request::{AUTHORIZATION, CONTENT_TYPE, RequestSpec};
use storycheck_domain::response::ResponseSpec;
use storycheck_domain::{AccessToken, Credentials, LoginRequest, LoginResponse, TokenSource};
use tracing::{debug, info};

use crate::error::AuthenticationError;
use crate::ports::{HttpClient, HttpClientError};

/// How the session obtains its token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// Pre-provisioned token. Used as-is when non-blank.
    pub access_token: Option<String>,
    /// Credentials for `POST /User/Login` when no token is configured.
    pub credentials: Option<Credentials>,
}

/// What a closed session reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Where the token came from.
    pub token_source: TokenSource,
    /// Requests sent through the session.
    pub requests_sent: usize,
    /// When the session was closed.
    pub closed_at: DateTime<Utc>,
}

/// Authenticated HTTP context shared by every case of a run.
pub struct Session<C: HttpClient> {
    client: Arc<C>,
    token: AccessToken,
    requests_sent: usize,
}

impl<C: HttpClient> Session<C> {
    /// Resolves a token and binds it to `client`.
    ///
    /// A configured non-blank token wins; otherwise the session logs in
    /// with the configured credentials. There are no retries.
    ///
    /// # Errors
    ///
    /// Returns an `AuthenticationError` when no token can be obtained.
    pub async fn open(client: Arc<C>, settings: &SessionSettings) -> Result<Self, AuthenticationError> {
        let configured = settings
            .access_token
            .as_deref()
            .and_then(|raw| AccessToken::parse(raw, TokenSource::Configured));

        let token = if let Some(token) = configured {
            info!("using pre-provisioned access token");
            token
        } else {
            let credentials = settings
                .credentials
                .as_ref()
                .ok_or(AuthenticationError::NoCredentials)?;
            login(client.as_ref(), credentials).await?
        };

        Ok(Self {
            client,
            token,
            requests_sent: 0,
        })
    }

    /// Returns the session's token.
    #[must_use]
    pub const fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns how many requests went through this session.
    #[must_use]
    pub const fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    /// Sends `request` with the session's bearer token attached.
    ///
    /// # Errors
    ///
    /// Returns the client's error when no response was obtained.
    pub async fn send(&mut self, request: RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let request = request.with_header(AUTHORIZATION, self.token.authorization_header());
        self.requests_sent += 1;
        debug!(request = %request.label(), "sending request");
        self.client.execute(&request).await
    }

    /// Releases the session.
    #[must_use]
    pub fn close(self) -> SessionSummary {
        info!(requests = self.requests_sent, "session closed");
        SessionSummary {
            token_source: self.token.source(),
            requests_sent: self.requests_sent,
            closed_at: Utc::now(),
        }
    }
}

/// Exchanges `credentials` for a token through `POST /User/Login`.
///
/// # Errors
///
/// - `LoginRejected` for any status other than 200, with the raw body
/// - `MalformedLoginResponse` when the 200 body is not JSON
/// - `MissingToken` when `accessToken` is absent or blank
/// - `Transport` when no response was obtained
pub async fn login<C: HttpClient + ?Sized>(
    client: &C,
    credentials: &Credentials,
) -> Result<AccessToken, AuthenticationError> {
    let body = LoginRequest {
        user_name: credentials.user_name.clone(),
        password: credentials.password.clone(),
    };
    let request = RequestSpec::post(LOGIN_PATH)
        .with_header(CONTENT_TYPE, "application/json")
        .with_json(&body)?;

    info!(user = %credentials.user_name, "logging in");
    let response = client.execute(&request).await?;

    if response.status != 200 {
        return Err(AuthenticationError::LoginRejected {
            status: response.status,
            body: response.body,
        });
    }

    let parsed: LoginResponse = response
        .json()
        .map_err(|e| AuthenticationError::MalformedLoginResponse(e.to_string()))?;

    parsed
        .access_token
        .as_deref()
        .and_then(|raw| AccessToken::parse(raw, TokenSource::Login))
        .ok_or(AuthenticationError::MissingToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedHttpClient;
    use pretty_assertions::assert_eq;
    use storycheck_domain::request::HttpMethod;

    fn with_credentials(token: Option<&str>) -> SessionSettings {
        SessionSettings {
            access_token: token.map(str::to_string),
            credentials: Some(Credentials::new("reader", "pa55")),
        }
    }

    #[tokio::test]
    async fn test_configured_token_skips_login() {
        let client = Arc::new(ScriptedHttpClient::new());
        let session = Session::open(Arc::clone(&client), &with_credentials(Some("static.jwt")))
            .await
            .expect("session should open");

        assert_eq!(session.token().as_str(), "static.jwt");
        assert_eq!(session.token().source(), TokenSource::Configured);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_token_falls_back_to_login() {
        let client = Arc::new(
            ScriptedHttpClient::new().route(
                HttpMethod::Post,
                LOGIN_PATH,
                200,
                r#"{"accessToken":"issued.jwt"}"#,
            ),
        );
        let session = Session::open(Arc::clone(&client), &with_credentials(Some("   ")))
            .await
            .expect("session should open");

        assert_eq!(session.token().as_str(), "issued.jwt");
        assert_eq!(session.token().source(), TokenSource::Login);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"userName": "reader", "password": "pa55"}))
        );
        assert!(!requests[0].headers.contains(AUTHORIZATION));
    }

    #[tokio::test]
    async fn test_login_rejected_reports_status_and_body() {
        let client = Arc::new(ScriptedHttpClient::new().route(
            HttpMethod::Post,
            LOGIN_PATH,
            401,
            "Invalid credentials",
        ));
        let result = Session::open(client, &with_credentials(None)).await;

        assert_eq!(
            result.err(),
            Some(AuthenticationError::LoginRejected {
                status: 401,
                body: "Invalid credentials".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let client = Arc::new(ScriptedHttpClient::new().route(
            HttpMethod::Post,
            LOGIN_PATH,
            200,
            r#"{"accessToken":"  "}"#,
        ));
        let result = Session::open(client, &with_credentials(None)).await;
        assert_eq!(result.err(), Some(AuthenticationError::MissingToken));
    }

    #[tokio::test]
    async fn test_login_with_non_json_body_fails() {
        let client = Arc::new(ScriptedHttpClient::new().route(
            HttpMethod::Post,
            LOGIN_PATH,
            200,
            "<html>ok</html>",
        ));
        let result = Session::open(client, &with_credentials(None)).await;
        assert!(matches!(
            result.err(),
            Some(AuthenticationError::MalformedLoginResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_no_token_and_no_credentials() {
        let client = Arc::new(ScriptedHttpClient::new());
        let result = Session::open(client, &SessionSettings::default()).await;
        assert_eq!(result.err(), Some(AuthenticationError::NoCredentials));
    }

    #[tokio::test]
    async fn test_login_transport_error() {
        let client = Arc::new(ScriptedHttpClient::new().fail(
            HttpMethod::Post,
            LOGIN_PATH,
            HttpClientError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 1,
            },
        ));
        let result = Session::open(client, &with_credentials(None)).await;
        assert!(matches!(
            result.err(),
            Some(AuthenticationError::Transport(
                HttpClientError::ConnectionRefused { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_send_attaches_bearer_and_close_counts() {
        let client = Arc::new(ScriptedHttpClient::new().route(
            HttpMethod::Get,
            "/Story/All",
            200,
            "[]",
        ));
        let mut session = Session::open(Arc::clone(&client), &with_credentials(Some("t0k")))
            .await
            .expect("session should open");

        let response = session
            .send(RequestSpec::get("/Story/All"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status, 200);

        let requests = client.requests();
        assert_eq!(requests[0].headers.get("authorization"), Some("Bearer t0k"));

        let summary = session.close();
        assert_eq!(summary.requests_sent, 1);
        assert_eq!(summary.token_source, TokenSource::Configured);
    }
}
