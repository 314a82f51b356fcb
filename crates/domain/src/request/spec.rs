//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Header, Headers, HttpMethod, QueryParam, QueryParams};
use crate::error::{DomainError, DomainResult};

/// Complete specification for an HTTP request against the Story API.
///
/// The path is relative to the configured base URL; the adapter resolves it
/// with [`RequestSpec::url_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Route relative to the base URL, e.g. `/Story/Add`
    pub path: String,
    /// Query parameters, appended in order
    #[serde(default)]
    pub query: QueryParams,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON body, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    /// Creates a request without query, headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.add(QueryParam::new(key, value));
        self
    }

    /// Sets a header, replacing any header with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(Header::new(name, value));
        self
    }

    /// Serializes `body` as the JSON payload of this request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Resolves the full URL of this request against `base`.
    ///
    /// Any path prefix on `base` is kept, so `https://host/api` and
    /// `/Story/All` resolve to `https://host/api/Story/All`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if `base` cannot carry a path.
    pub fn url_for(&self, base: &Url) -> DomainResult<Url> {
        if base.cannot_be_a_base() {
            return Err(DomainError::InvalidUrl(format!(
                "{base} cannot be used as a base URL"
            )));
        }

        let mut url = base.clone();
        let path = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        url.set_path(&path);
        url.set_query(None);

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in self.query.all() {
                pairs.append_pair(&param.key, &param.value);
            }
        }

        Ok(url)
    }

    /// Short `METHOD path` label used in logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
