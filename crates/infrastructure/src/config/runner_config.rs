//! Layered run configuration backed by the `config` crate.

use std::fmt;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use storycheck_application::SessionSettings;
use storycheck_domain::{Credentials, PlanOptions, StoryLocator};
use url::Url;

use super::ConfigError;

/// Story API deployment used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://d3s5nxhwblsjbi.cloudfront.net";
/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Environment variable prefix, e.g. `STORYCHECK_BASE_URL`.
pub const ENV_PREFIX: &str = "STORYCHECK";
/// Configuration file picked up from the working directory when present.
pub const CONFIG_FILE_NAME: &str = "storycheck.toml";

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Explicit configuration file. Must exist when set.
    pub config_file: Option<PathBuf>,
    /// Base URL of the Story API.
    pub base_url: Option<String>,
}

/// Everything a run needs to know.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the Story API.
    pub base_url: String,
    /// Pre-provisioned JWT. Skips the login call when non-blank.
    pub access_token: Option<String>,
    /// Login user name.
    pub user_name: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Id used by the non-existing story checks.
    pub non_existing_story_id: String,
    /// How the list case picks the story to edit and delete.
    pub story_locator: StoryLocator,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            user_name: None,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            non_existing_story_id: PlanOptions::default().non_existing_story_id,
            story_locator: StoryLocator::default(),
        }
    }
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("RunnerConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &redact(&self.access_token))
            .field("user_name", &self.user_name)
            .field("password", &redact(&self.password))
            .field("timeout_ms", &self.timeout_ms)
            .field("non_existing_story_id", &self.non_existing_story_id)
            .field("story_locator", &self.story_locator)
            .finish()
    }
}

impl RunnerConfig {
    /// Loads and validates the configuration from every layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read, a value has the
    /// wrong type, or the result fails validation.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with_env(overrides, None)
    }

    /// Same as [`Self::load`], reading environment variables from `env`
    /// instead of the process environment when it is `Some`.
    fn load_with_env(
        overrides: &ConfigOverrides,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = match &overrides.config_file {
            Some(path) => File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            None => File::new(CONFIG_FILE_NAME, FileFormat::Toml).required(false),
        };

        // Values stay strings; typed fields such as `timeout_ms` convert on deserialize
        let environment = Environment::with_prefix(ENV_PREFIX).source(env);

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(environment)
            .set_override_option("base_url", overrides.base_url.clone())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the values a run cannot start without.
    ///
    /// # Errors
    ///
    /// - `InvalidBaseUrl` unless the base URL is absolute http(s)
    /// - `InvalidValue` for a zero timeout or a blank non-existing id
    /// - `MissingCredentials` when there is no token and no full credential pair
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.non_existing_story_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "non_existing_story_id",
                message: "must not be blank".to_string(),
            });
        }

        if self.token().is_none() && self.credentials().is_none() {
            return Err(ConfigError::MissingCredentials);
        }

        Ok(())
    }

    /// Session bootstrap settings derived from this configuration.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            access_token: self.token().map(str::to_string),
            credentials: self.credentials(),
        }
    }

    /// Plan knobs derived from this configuration.
    #[must_use]
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            non_existing_story_id: self.non_existing_story_id.trim().to_string(),
            locator: self.story_locator,
        }
    }

    fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    fn credentials(&self) -> Option<Credentials> {
        let user_name = self.user_name.as_deref().filter(|u| !u.trim().is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some(Credentials::new(user_name, password))
    }
}
