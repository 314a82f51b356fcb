//! Assertion runner implementation.
//!
//! Executes assertions against HTTP responses and produces assertion results.

use storycheck_application::ports::ResponseVerifier;
use storycheck_domain::response::ResponseSpec;
use storycheck_domain::testing::{Assertion, AssertionResult};

/// Body characters quoted in failure messages.
const PREVIEW_CHARS: usize = 100;

/// Runner that executes assertions against responses.
///
/// Every failure message carries the expected value, the actual status and a
/// preview of the raw body.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssertionRunner;

impl AssertionRunner {
    /// Create a new assertion runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run a single assertion against a response.
    #[must_use]
    pub fn run_assertion(assertion: &Assertion, response: &ResponseSpec) -> AssertionResult {
        match assertion {
            Assertion::StatusCode { expected } => {
                Self::check_status_code(assertion, response, *expected)
            }
            Assertion::BodyNotEmpty => Self::check_body_not_empty(assertion, response),
            Assertion::BodyContains { text } => Self::check_body_contains(assertion, response, text),
            Assertion::JsonPath { path, expected } => {
                Self::check_json_path(assertion, response, path, expected.as_ref())
            }
            Assertion::JsonArrayNotEmpty { path } => {
                Self::check_json_array_not_empty(assertion, response, path)
            }
        }
    }

    fn failure(
        assertion: &Assertion,
        response: &ResponseSpec,
        actual: impl Into<String>,
        message: &str,
    ) -> AssertionResult {
        AssertionResult::fail_with_value(
            assertion.clone(),
            actual,
            format!(
                "{message} (status {}, body: {:?})",
                response.status,
                response.body_preview(PREVIEW_CHARS)
            ),
        )
    }

    fn check_status_code(
        assertion: &Assertion,
        response: &ResponseSpec,
        expected: u16,
    ) -> AssertionResult {
        let actual = response.status;
        if actual == expected {
            AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
        } else {
            Self::failure(
                assertion,
                response,
                actual.to_string(),
                &format!("Expected status {expected}, got {actual}"),
            )
        }
    }

    fn check_body_not_empty(assertion: &Assertion, response: &ResponseSpec) -> AssertionResult {
        if response.is_body_blank() {
            Self::failure(assertion, response, "", "Expected a non-empty body")
        } else {
            AssertionResult::pass(assertion.clone())
        }
    }

    fn check_body_contains(
        assertion: &Assertion,
        response: &ResponseSpec,
        text: &str,
    ) -> AssertionResult {
        if response.body.contains(text) {
            AssertionResult::pass(assertion.clone())
        } else {
            Self::failure(
                assertion,
                response,
                response.body_preview(PREVIEW_CHARS),
                &format!("Body does not contain '{text}'"),
            )
        }
    }

    fn check_json_path(
        assertion: &Assertion,
        response: &ResponseSpec,
        path: &str,
        expected: Option<&serde_json::Value>,
    ) -> AssertionResult {
        let value = match Self::resolve(assertion, response, path) {
            Ok(value) => value,
            Err(failed) => return failed,
        };

        match expected {
            Some(expected_value) if &value != expected_value => Self::failure(
                assertion,
                response,
                value.to_string(),
                &format!("JSON path '{path}' value mismatch: expected {expected_value}, got {value}"),
            ),
            _ => AssertionResult::pass_with_value(assertion.clone(), value.to_string()),
        }
    }

    fn check_json_array_not_empty(
        assertion: &Assertion,
        response: &ResponseSpec,
        path: &str,
    ) -> AssertionResult {
        let value = match Self::resolve(assertion, response, path) {
            Ok(value) => value,
            Err(failed) => return failed,
        };

        match value.as_array() {
            Some(items) if !items.is_empty() => {
                AssertionResult::pass_with_value(assertion.clone(), format!("{} items", items.len()))
            }
            Some(_) => Self::failure(
                assertion,
                response,
                "[]",
                &format!("Expected JSON path '{path}' to be a non-empty array, got an empty one"),
            ),
            None => Self::failure(
                assertion,
                response,
                value.to_string(),
                &format!("Expected JSON path '{path}' to be an array, got {value}"),
            ),
        }
    }

    /// Parses the body and queries `path`, turning every miss into a failed result.
    fn resolve(
        assertion: &Assertion,
        response: &ResponseSpec,
        path: &str,
    ) -> Result<serde_json::Value, AssertionResult> {
        let json = serde_json::from_str::<serde_json::Value>(&response.body).map_err(|e| {
            Self::failure(
                assertion,
                response,
                response.body_preview(PREVIEW_CHARS),
                &format!("Failed to parse body as JSON: {e}"),
            )
        })?;

        match query_json_path(&json, path) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Self::failure(
                assertion,
                response,
                "",
                &format!("JSON path '{path}' not found"),
            )),
            Err(e) => Err(AssertionResult::fail(
                assertion.clone(),
                format!("Invalid JSON path '{path}': {e}"),
            )),
        }
    }
}

impl ResponseVerifier for AssertionRunner {
    fn verify(&self, assertions: &[Assertion], response: &ResponseSpec) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| Self::run_assertion(assertion, response))
            .collect()
    }
}

/// Query a JSON value with a dotted path: `$`, `$.field`, `$.field.nested`.
fn query_json_path(
    json: &serde_json::Value,
    path: &str,
) -> Result<Option<serde_json::Value>, String> {
    let Some(path) = path.trim().strip_prefix('$') else {
        return Err("JSON path must start with '$'".to_string());
    };

    if path.is_empty() {
        return Ok(Some(json.clone()));
    }

    let Some(path) = path.strip_prefix('.') else {
        return Err("expected '.' after '$'".to_string());
    };

    let mut current = json;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err("empty path segment".to_string());
        }
        match current.get(segment) {
            Some(v) => current = v,
            None => return Ok(None),
        }
    }

    Ok(Some(current.clone()))
}
