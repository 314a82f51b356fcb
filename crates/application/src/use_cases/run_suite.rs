//! Run Story Suite Use Case
//!
//! Opens a session, executes every case of a plan in sequence order and
//! closes the session. Case failures are recorded and the run continues;
//! only a bootstrap failure ends the run early.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use storycheck_domain::response::ResponseSpec;
use storycheck_domain::{
    ApiResponseEnvelope, Capture, CaseOutcome, CasePlan, CaseReport, CaseSpec, DomainError,
    RunContext, RunReport, StoryRecord,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApplicationResult;
use crate::ports::{HttpClient, ResponseVerifier};
use crate::session::{Session, SessionSettings};

/// Longest body excerpt written to debug logs.
const LOG_BODY_CHARS: usize = 512;

/// Use case executing an ordered case plan against the Story API.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(ReqwestHttpClient::new(&base_url, 30_000)?);
/// let suite = RunStorySuite::new(client, AssertionRunner::new(), base_url);
/// let report = suite.execute(&settings, &story_crud_plan(&options)?).await?;
/// ```
pub struct RunStorySuite<C: HttpClient, V: ResponseVerifier> {
    client: Arc<C>,
    verifier: V,
    base_url: String,
}

impl<C: HttpClient, V: ResponseVerifier> RunStorySuite<C, V> {
    /// Creates the use case. `base_url` is only recorded in the report.
    pub fn new(client: Arc<C>, verifier: V, base_url: impl Into<String>) -> Self {
        Self {
            client,
            verifier,
            base_url: base_url.into(),
        }
    }

    /// Runs every case of `plan` in order.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Authentication` if the session cannot be
    /// opened; no case runs in that case. Case-level failures never produce
    /// an error, they are recorded in the report.
    pub async fn execute(
        &self,
        settings: &SessionSettings,
        plan: &CasePlan,
    ) -> ApplicationResult<RunReport> {
        let mut session = match Session::open(Arc::clone(&self.client), settings).await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "session bootstrap failed, no case was run");
                return Err(e.into());
            }
        };

        let started_at = Utc::now();
        let mut context = RunContext::new();
        let mut cases = Vec::with_capacity(plan.len());

        for case in plan.cases() {
            cases.push(self.run_case(&mut session, case, &mut context).await);
        }

        let summary = session.close();
        let report = RunReport {
            run_id: Uuid::now_v7(),
            base_url: self.base_url.clone(),
            token_source: summary.token_source,
            started_at,
            finished_at: summary.closed_at,
            requests_sent: summary.requests_sent,
            cases,
        };

        info!(
            passed = report.passed(),
            failed = report.failed(),
            total = report.total(),
            "run finished"
        );
        Ok(report)
    }

    async fn run_case(
        &self,
        session: &mut Session<C>,
        case: &CaseSpec,
        context: &mut RunContext,
    ) -> CaseReport {
        let start = Instant::now();
        info!(sequence = case.sequence, name = %case.name, "running case");

        let mut report = CaseReport {
            sequence: case.sequence,
            name: case.name.clone(),
            method: case.method,
            path: case.path.clone(),
            outcome: CaseOutcome::Passed,
            status: None,
            assertions: Vec::new(),
            captured_story_id: None,
            capture_error: None,
            duration_ms: 0,
        };

        let outcome = match case.build_request(context) {
            Err(DomainError::MissingState(reason)) => CaseOutcome::MissingState { reason },
            Err(other) => CaseOutcome::Errored {
                message: other.to_string(),
            },
            Ok(request) => match session.send(request).await {
                Err(e) => CaseOutcome::Errored {
                    message: e.to_string(),
                },
                Ok(response) => self.check_response(case, &response, context, &mut report),
            },
        };
        report.outcome = outcome;
        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &report.outcome {
            CaseOutcome::Passed => info!(sequence = case.sequence, "case passed"),
            CaseOutcome::Failed => {
                for failure in report.failures() {
                    warn!(
                        sequence = case.sequence,
                        assertion = %failure.assertion.description(),
                        error = failure.error.as_deref().unwrap_or_default(),
                        "assertion failed"
                    );
                }
                if let Some(capture_error) = &report.capture_error {
                    warn!(sequence = case.sequence, error = %capture_error, "capture failed");
                }
            }
            CaseOutcome::MissingState { reason } => {
                warn!(sequence = case.sequence, %reason, "case not sent");
            }
            CaseOutcome::Errored { message } => {
                warn!(sequence = case.sequence, error = %message, "request failed");
            }
        }

        report
    }

    fn check_response(
        &self,
        case: &CaseSpec,
        response: &ResponseSpec,
        context: &mut RunContext,
        report: &mut CaseReport,
    ) -> CaseOutcome {
        debug!(
            status = %response.status_line(),
            body = %response.body_preview(LOG_BODY_CHARS),
            "response received"
        );
        if let Ok(envelope) = response.json::<ApiResponseEnvelope>() {
            debug!(msg = %envelope.msg, "api message");
        }

        report.status = Some(response.status);
        report.assertions = self.verifier.verify(&case.assertions, response);

        if report.assertions.iter().any(|r| !r.passed) {
            return CaseOutcome::Failed;
        }

        if let Some(capture) = &case.capture {
            match apply_capture(capture, response, context) {
                Ok(id) => {
                    info!(sequence = case.sequence, story_id = %id, "captured story id");
                    report.captured_story_id = Some(id);
                }
                Err(e) => {
                    report.capture_error = Some(e);
                    return CaseOutcome::Failed;
                }
            }
        }

        CaseOutcome::Passed
    }
}

/// Extracts state from `response` into `context`, returning the stored id.
fn apply_capture(
    capture: &Capture,
    response: &ResponseSpec,
    context: &mut RunContext,
) -> Result<String, String> {
    match capture {
        Capture::StoryId { locator, title } => {
            let stories: Vec<StoryRecord> = response.json().map_err(|e| e.to_string())?;
            let story = locator.locate(&stories, title).ok_or_else(|| {
                format!(
                    "no story matched locator '{locator}' among {} stories",
                    stories.len()
                )
            })?;
            context.set_last_created_story_id(story.id.clone());
            Ok(story.id.clone())
        }
    }
}
