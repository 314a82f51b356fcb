//! Storycheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading
//! and report output.

pub mod adapters;
pub mod config;
pub mod report;
pub mod testing;

pub use adapters::ReqwestHttpClient;
pub use self::config::{ConfigError, ConfigOverrides, RunnerConfig};
pub use report::{SerializationError, render_summary, to_json_stable, write_json_report};
pub use testing::AssertionRunner;
