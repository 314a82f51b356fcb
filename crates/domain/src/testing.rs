//! Response assertions.
//!
//! This module provides the checks a case runs against the response it
//! receives, and the per-assertion results recorded in the run report.

use serde::{Deserialize, Serialize};

/// A test assertion to run against a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Check the response status code.
    StatusCode {
        /// Exact expected status code.
        expected: u16,
    },
    /// Check the body is not empty.
    BodyNotEmpty,
    /// Check body contains text.
    BodyContains {
        /// Text to search for.
        text: String,
    },
    /// Check JSON path exists and optionally its value.
    JsonPath {
        /// JSONPath expression (e.g., "$.msg").
        path: String,
        /// Expected value (as JSON).
        expected: Option<serde_json::Value>,
    },
    /// Check JSON path resolves to a non-empty array.
    JsonArrayNotEmpty {
        /// JSONPath expression; `$` is the whole body.
        path: String,
    },
}

impl Assertion {
    /// Exact status code check.
    #[must_use]
    pub const fn status(expected: u16) -> Self {
        Self::StatusCode { expected }
    }

    /// Case-sensitive substring check on the body.
    #[must_use]
    pub fn body_contains(text: impl Into<String>) -> Self {
        Self::BodyContains { text: text.into() }
    }

    /// Checks that `path` holds `expected`.
    #[must_use]
    pub fn json_equals(path: impl Into<String>, expected: serde_json::Value) -> Self {
        Self::JsonPath {
            path: path.into(),
            expected: Some(expected),
        }
    }

    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("Status code = {expected}"),
            Self::BodyNotEmpty => "Body is not empty".to_string(),
            Self::BodyContains { text } => format!("Body contains '{text}'"),
            Self::JsonPath {
                path,
                expected: Some(v),
            } => format!("JSON {path} equals {v}"),
            Self::JsonPath {
                path,
                expected: None,
            } => format!("JSON {path} exists"),
            Self::JsonArrayNotEmpty { path } => format!("JSON {path} is a non-empty array"),
        }
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub const fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}
