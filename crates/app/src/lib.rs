//! Storycheck - Story API integration test runner
//!
//! Wires configuration, the reqwest adapter and the assertion runner into
//! the run use case, then reports the outcome.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use storycheck_application::RunStorySuite;
use storycheck_domain::{RunReport, story_crud_plan};
use storycheck_infrastructure::{
    AssertionRunner, ConfigOverrides, ReqwestHttpClient, RunnerConfig, render_summary,
    write_json_report,
};
use tracing::{error, info};

/// Command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "storycheck", version)]
#[command(about = "Runs the ordered Story API integration cases")]
pub struct Cli {
    /// TOML configuration file (defaults to ./storycheck.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Story API, overrides every other setting
    #[arg(long)]
    pub base_url: Option<String>,

    /// Also write the run report as JSON to this file
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    /// Run only these case numbers (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<u8>,
}

impl Cli {
    /// Configuration values taken from the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// How a run ended, as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every case passed.
    Passed,
    /// At least one case did not pass.
    CasesFailed,
    /// Configuration or session bootstrap failed; no case ran.
    SetupFailed,
}

impl RunStatus {
    /// Process exit code: 0, 1 or 2.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Passed => 0,
            Self::CasesFailed => 1,
            Self::SetupFailed => 2,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        Self::from(status.code())
    }
}

/// Runs the suite and maps the result to a [`RunStatus`].
pub async fn run(cli: &Cli) -> RunStatus {
    match execute(cli).await {
        Ok(report) if report.all_passed() => RunStatus::Passed,
        Ok(_) => RunStatus::CasesFailed,
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("storycheck: {e}");
            RunStatus::SetupFailed
        }
    }
}

/// Loads configuration, runs the plan and writes the reports.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the session cannot be
/// opened, or the JSON report cannot be written. Failing cases are not
/// errors; they are part of the returned report.
pub async fn execute(cli: &Cli) -> Result<RunReport, Box<dyn Error>> {
    let config = RunnerConfig::load(&cli.overrides())?;
    info!(?config, "configuration loaded");

    let mut plan = story_crud_plan(&config.plan_options())?;
    if !cli.only.is_empty() {
        plan = plan.only(&cli.only)?;
    }

    let client = Arc::new(ReqwestHttpClient::new(&config.base_url, config.timeout_ms)?);
    let suite = RunStorySuite::new(client, AssertionRunner::new(), config.base_url.clone());
    let report = suite.execute(&config.session_settings(), &plan).await?;

    print!("{}", render_summary(&report));

    if let Some(path) = &cli.json_report {
        write_json_report(&report, path).await?;
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "storycheck",
            "--config",
            "ci.toml",
            "--base-url",
            "http://localhost:8080",
            "--json-report",
            "out/report.json",
            "--only",
            "5,6,7",
        ])
        .unwrap();

        assert_eq!(cli.only, vec![5, 6, 7]);
        assert_eq!(
            cli.overrides(),
            ConfigOverrides {
                config_file: Some(PathBuf::from("ci.toml")),
                base_url: Some("http://localhost:8080".to_string()),
            }
        );
        assert_eq!(cli.json_report, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn test_no_flags() {
        let cli = Cli::try_parse_from(["storycheck"]).unwrap();
        assert!(cli.only.is_empty());
        assert_eq!(cli.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn test_rejects_bad_case_number() {
        assert!(Cli::try_parse_from(["storycheck", "--only", "seven"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Passed.code(), 0);
        assert_eq!(RunStatus::CasesFailed.code(), 1);
        assert_eq!(RunStatus::SetupFailed.code(), 2);
    }
}
