//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Request paths are resolved against the configured base URL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, Url};
use storycheck_application::ports::{HttpClient, HttpClientError, HttpFuture};
use storycheck_domain::request::{CONTENT_TYPE, HttpMethod, RequestSpec};
use storycheck_domain::response::ResponseSpec;
use tracing::trace;

const USER_AGENT: &str = concat!("storycheck/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
///
/// Wraps a `reqwest::Client` bound to one base URL and one timeout.
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a client for `base_url`.
    ///
    /// Configuration:
    /// - Request timeout: `timeout_ms`
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if `base_url` is not an absolute http(s) URL, or
    /// `Other` if the client cannot be created.
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Self::with_client(client, base_url, timeout_ms)
    }

    /// Creates a client around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if `base_url` is not an absolute http(s) URL.
    pub fn with_client(
        client: Client,
        base_url: &str,
        timeout_ms: u64,
    ) -> Result<Self, HttpClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base_url}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HttpClientError::InvalidUrl(format!(
                "unsupported scheme '{}' in {base_url}",
                base_url.scheme()
            )));
        }

        Ok(Self {
            client,
            base_url,
            timeout_ms,
        })
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Encodes the JSON body, if any.
    fn encode_body(request: &RequestSpec) -> Result<Option<String>, HttpClientError> {
        request
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| HttpClientError::InvalidBody(format!("Invalid JSON: {e}")))
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = format!("{error:?}");
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(error.to_string());
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &RequestSpec) -> HttpFuture<'_> {
        let method = request.method;
        let url = request
            .url_for(&self.base_url)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()));
        let headers: Vec<_> = request.headers.iter().cloned().collect();
        let body = Self::encode_body(request);
        let timeout_ms = self.timeout_ms;

        Box::pin(async move {
            let url = url?;
            let body = body?;
            trace!(%method, %url, "executing request");

            let start = Instant::now();

            let mut builder = self.client.request(Self::to_reqwest_method(method), url);

            for header in &headers {
                builder = builder.header(&header.name, &header.value);
            }

            if let Some(body) = body {
                let has_content_type = headers
                    .iter()
                    .any(|h| h.name.eq_ignore_ascii_case(CONTENT_TYPE));
                if !has_content_type {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();

            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;

            let duration = start.elapsed();

            Ok(ResponseSpec::new(
                status,
                response_headers,
                &body_bytes,
                duration,
            ))
        })
    }
}
