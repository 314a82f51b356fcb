//! Per-case and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::TokenSource;
use crate::request::HttpMethod;
use crate::testing::AssertionResult;

/// How a case ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every assertion passed and any capture succeeded.
    Passed,
    /// An assertion or the capture step failed.
    Failed,
    /// The case needed state an earlier case did not produce; nothing was sent.
    MissingState {
        /// What was missing.
        reason: String,
    },
    /// The request never produced a response.
    Errored {
        /// Transport or encoding error.
        message: String,
    },
}

impl CaseOutcome {
    /// Returns true only for `Passed`.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Short label for console output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::MissingState { .. } => "SKIP",
            Self::Errored { .. } => "ERROR",
        }
    }
}

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Position in the run.
    pub sequence: u8,
    /// Case name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Route.
    pub path: String,
    /// How the case ended.
    #[serde(flatten)]
    pub outcome: CaseOutcome,
    /// Status code received, if any.
    pub status: Option<u16>,
    /// Individual assertion results.
    pub assertions: Vec<AssertionResult>,
    /// Story id stored by a capture step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_story_id: Option<String>,
    /// Why the capture step failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_error: Option<String>,
    /// Wall time of the case in milliseconds.
    pub duration_ms: u64,
}

impl CaseReport {
    /// Returns the failed assertion results.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.assertions.iter().filter(|r| !r.passed)
    }
}

/// Results of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Base URL the run targeted.
    pub base_url: String,
    /// Where the bearer token came from.
    pub token_source: TokenSource,
    /// When bootstrap finished.
    pub started_at: DateTime<Utc>,
    /// When the session was closed.
    pub finished_at: DateTime<Utc>,
    /// Requests sent through the session, login excluded.
    pub requests_sent: usize,
    /// Case results in execution order.
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    /// Total number of cases.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_passed()).count()
    }

    /// Number of cases that did not pass.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Check if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.cases.is_empty() {
            100.0
        } else {
            (self.passed() as f64 / self.total() as f64) * 100.0
        }
    }

    /// Finds a case by sequence number.
    #[must_use]
    pub fn case(&self, sequence: u8) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.sequence == sequence)
    }

    /// Wall time between bootstrap and teardown in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
