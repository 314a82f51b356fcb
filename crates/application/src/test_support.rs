//! Scripted ports for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use storycheck_domain::request::{HttpMethod, RequestSpec};
use storycheck_domain::response::ResponseSpec;
use storycheck_domain::{Assertion, AssertionResult};

use crate::ports::{HttpClient, HttpClientError, HttpFuture, ResponseVerifier};

type Scripted = Result<(u16, String), HttpClientError>;

/// HTTP client answering from a fixed route table and recording every request.
///
/// Unknown routes answer 404.
pub struct ScriptedHttpClient {
    routes: HashMap<(HttpMethod, String), Scripted>,
    requests: Mutex<Vec<RequestSpec>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method, path.to_string()), Ok((status, body.to_string())));
        self
    }

    pub fn fail(mut self, method: HttpMethod, path: &str, error: HttpClientError) -> Self {
        self.routes.insert((method, path.to_string()), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(&self, request: &RequestSpec) -> HttpFuture<'_> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self
            .routes
            .get(&(request.method, request.path.clone()))
            .cloned()
            .unwrap_or_else(|| Ok((404, String::new())));

        Box::pin(async move {
            let (status, body) = scripted?;
            Ok(ResponseSpec::new(
                status,
                HashMap::new(),
                body.as_bytes(),
                Duration::from_millis(5),
            ))
        })
    }
}

/// Minimal verifier covering the assertions the Story plan uses.
///
/// JSON paths are limited to `$` and `$.field`.
pub struct SimpleVerifier;

impl SimpleVerifier {
    fn lookup(json: &serde_json::Value, path: &str) -> Option<serde_json::Value> {
        match path.strip_prefix("$.") {
            Some(field) => json.get(field).cloned(),
            None if path == "$" => Some(json.clone()),
            None => None,
        }
    }

    fn check(assertion: &Assertion, response: &ResponseSpec) -> bool {
        let json = serde_json::from_str::<serde_json::Value>(&response.body).ok();
        match assertion {
            Assertion::StatusCode { expected } => response.status == *expected,
            Assertion::BodyNotEmpty => !response.is_body_blank(),
            Assertion::BodyContains { text } => response.body.contains(text.as_str()),
            Assertion::JsonPath { path, expected } => json
                .and_then(|j| Self::lookup(&j, path))
                .is_some_and(|v| expected.as_ref().is_none_or(|e| &v == e)),
            Assertion::JsonArrayNotEmpty { path } => json
                .and_then(|j| Self::lookup(&j, path))
                .and_then(|v| v.as_array().map(|a| !a.is_empty()))
                .unwrap_or(false),
        }
    }
}

impl ResponseVerifier for SimpleVerifier {
    fn verify(&self, assertions: &[Assertion], response: &ResponseSpec) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| {
                if Self::check(assertion, response) {
                    AssertionResult::pass(assertion.clone())
                } else {
                    AssertionResult::fail_with_value(
                        assertion.clone(),
                        response.status.to_string(),
                        format!("{} failed", assertion.description()),
                    )
                }
            })
            .collect()
    }
}
