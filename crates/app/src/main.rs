//! Storycheck - Main Entry Point
//!
//! Parses the command line, installs logging and runs the Story API cases.
//! Exits with 0 when every case passed, 1 when a case failed and 2 when the
//! run could not start.

use std::process::ExitCode;

use clap::Parser;
use storycheck::{Cli, run};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the summary
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting storycheck v{}", env!("CARGO_PKG_VERSION"));

    run(&cli).await.into()
}
