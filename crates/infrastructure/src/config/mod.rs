//! Run configuration.
//!
//! Settings are layered: built-in defaults, an optional TOML file,
//! `STORYCHECK_*` environment variables and finally command-line overrides.

mod error;
mod runner_config;

pub use error::ConfigError;
pub use runner_config::{
    CONFIG_FILE_NAME, ConfigOverrides, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, ENV_PREFIX,
    RunnerConfig,
};
