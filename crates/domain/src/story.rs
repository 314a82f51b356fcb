//! Story API resources and wire payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// Body of `POST /Story/Add` and `PUT /Story/Edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPayload {
    /// Story title.
    pub title: String,
    /// Story description.
    pub description: String,
    /// Workflow status such as `Pending` or `InProgress`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Payload sent when creating a story.
pub type StoryCreateRequest = StoryPayload;

/// Payload sent when editing a story.
pub type StoryEditRequest = StoryPayload;

impl StoryPayload {
    /// Creates a payload without a status.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A story as returned by `GET /Story/All`.
///
/// Only `id` is required; the API may omit the remaining fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    /// Server-assigned identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Story title.
    #[serde(default)]
    pub title: Option<String>,
    /// Story description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status.
    #[serde(default)]
    pub status: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Generic `{ "msg": ... }` envelope returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponseEnvelope {
    /// Human-readable outcome message.
    pub msg: String,
}

/// Body of `POST /User/Login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account user name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login body. Other fields returned by the API are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT issued for the account.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// How the list case picks the story that later cases edit and delete.
///
/// The API does not document the order of `GET /Story/All`, so the choice is
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryLocator {
    /// The last element of the list.
    #[default]
    Last,
    /// The last element whose title equals the title created earlier in the run.
    Title,
}

impl StoryLocator {
    /// Picks a story from `stories`.
    #[must_use]
    pub fn locate<'a>(self, stories: &'a [StoryRecord], title: &str) -> Option<&'a StoryRecord> {
        match self {
            Self::Last => stories.last(),
            Self::Title => stories
                .iter()
                .rev()
                .find(|story| story.title.as_deref() == Some(title)),
        }
    }

    /// Returns the configuration name of this locator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last => "last",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for StoryLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryLocator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "title" => Ok(Self::Title),
            other => Err(DomainError::InvalidPlan(format!(
                "unknown story locator '{other}' (expected 'last' or 'title')"
            ))),
        }
    }
}
