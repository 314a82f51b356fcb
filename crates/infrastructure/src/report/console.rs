//! Human-readable run summary.

use std::fmt;

use storycheck_domain::{CaseOutcome, CaseReport, RunReport};

/// Plain-text summary of a run: one line per case followed by the reasons
/// of anything that did not pass.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a>(pub &'a RunReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(
            f,
            "Story API run {} against {} ({})",
            report.run_id, report.base_url, report.token_source
        )?;

        for case in &report.cases {
            write!(f, "{}", CaseLine(case))?;
        }

        writeln!(
            f,
            "{} cases: {} passed, {} failed ({:.1}%) in {} ms, {} requests sent",
            report.total(),
            report.passed(),
            report.failed(),
            report.pass_rate(),
            report.duration_ms(),
            report.requests_sent
        )
    }
}

struct CaseLine<'a>(&'a CaseReport);

impl fmt::Display for CaseLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let case = self.0;
        let status = case
            .status
            .map_or_else(|| "---".to_string(), |s| s.to_string());
        let label = format!("[{}]", case.outcome.label());

        writeln!(
            f,
            "  {label:<8}{:>2}. {:<40}{:<7}{:<16}{status:>4} {:>6} ms",
            case.sequence,
            case.name,
            case.method.as_str(),
            case.path,
            case.duration_ms
        )?;

        match &case.outcome {
            CaseOutcome::Passed => Ok(()),
            CaseOutcome::Failed => {
                for failure in case.failures() {
                    writeln!(
                        f,
                        "        - {}: {}",
                        failure.assertion.description(),
                        failure.error.as_deref().unwrap_or("failed")
                    )?;
                }
                if let Some(error) = &case.capture_error {
                    writeln!(f, "        - capture: {error}")?;
                }
                Ok(())
            }
            CaseOutcome::MissingState { reason } => writeln!(f, "        - not sent: {reason}"),
            CaseOutcome::Errored { message } => writeln!(f, "        - {message}"),
        }
    }
}

/// Renders `report` through [`Summary`].
#[must_use]
pub fn render_summary(report: &RunReport) -> String {
    Summary(report).to_string()
}
