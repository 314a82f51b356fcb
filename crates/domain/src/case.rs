//! Case descriptors and the state threaded between cases.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::{CONTENT_TYPE, HttpMethod, RequestSpec};
use crate::story::{StoryLocator, StoryPayload};
use crate::testing::Assertion;

/// Query parameter carrying the story id on edit and delete routes.
pub const STORY_ID_PARAM: &str = "storyId";

/// State produced by one case and consumed by later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    last_created_story_id: Option<String>,
}

impl RunContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_created_story_id: None,
        }
    }

    /// Returns the story id captured by the list case.
    #[must_use]
    pub fn last_created_story_id(&self) -> Option<&str> {
        self.last_created_story_id.as_deref()
    }

    /// Records the story id later cases operate on.
    pub fn set_last_created_story_id(&mut self, id: impl Into<String>) {
        self.last_created_story_id = Some(id.into());
    }
}

/// Which story id, if any, a case sends as `storyId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StoryIdSource {
    /// The route takes no story id.
    None,
    /// The id captured earlier in the run.
    Captured,
    /// A fixed id, used for the non-existing story checks.
    Fixed(String),
}

/// What a case extracts from a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capture {
    /// Decode the body as a story list and store the located story's id.
    StoryId {
        /// How to pick the story.
        locator: StoryLocator,
        /// Title created earlier in the run, used by `StoryLocator::Title`.
        title: String,
    },
}

/// One ordered step: a single request and the checks on its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Position in the run, starting at 1.
    pub sequence: u8,
    /// Human-readable name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Route relative to the base URL.
    pub path: String,
    /// Story id sent as a query parameter.
    pub story_id: StoryIdSource,
    /// JSON body.
    pub body: Option<StoryPayload>,
    /// Checks run against the response, in order.
    pub assertions: Vec<Assertion>,
    /// State extracted once every assertion has passed.
    pub capture: Option<Capture>,
}

impl CaseSpec {
    /// Creates a case with no story id, body, assertions or capture.
    #[must_use]
    pub fn new(
        sequence: u8,
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        Self {
            sequence,
            name: name.into(),
            method,
            path: path.into(),
            story_id: StoryIdSource::None,
            body: None,
            assertions: Vec::new(),
            capture: None,
        }
    }

    /// Sets the story id source.
    #[must_use]
    pub fn with_story_id(mut self, source: StoryIdSource) -> Self {
        self.story_id = source;
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: StoryPayload) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Sets the capture step.
    #[must_use]
    pub fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Returns true if the case reads the captured story id.
    #[must_use]
    pub const fn needs_captured_id(&self) -> bool {
        matches!(self.story_id, StoryIdSource::Captured)
    }

    /// Builds the request for this case from the current run state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingState` when the case reads a story id that
    /// no earlier case captured, and `DomainError::InvalidBody` if the body
    /// cannot be encoded.
    pub fn build_request(&self, context: &RunContext) -> DomainResult<RequestSpec> {
        let mut request = RequestSpec::new(self.method, self.path.clone());

        match &self.story_id {
            StoryIdSource::None => {}
            StoryIdSource::Captured => {
                let id = context.last_created_story_id().ok_or_else(|| {
                    DomainError::MissingState(
                        "no story id was captured by an earlier case".to_string(),
                    )
                })?;
                request = request.with_query(STORY_ID_PARAM, id);
            }
            StoryIdSource::Fixed(id) => {
                request = request.with_query(STORY_ID_PARAM, id.clone());
            }
        }

        if let Some(body) = &self.body {
            request = request
                .with_header(CONTENT_TYPE, "application/json")
                .with_json(body)?;
        }

        Ok(request)
    }
}
