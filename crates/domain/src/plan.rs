//! The ordered Story API case plan.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::case::{Capture, CaseSpec, StoryIdSource};
use crate::error::{DomainError, DomainResult};
use crate::request::HttpMethod;
use crate::story::{StoryLocator, StoryPayload};
use crate::testing::Assertion;

/// Route that creates a story.
pub const ADD_STORY_PATH: &str = "/Story/Add";
/// Route that lists every story.
pub const ALL_STORIES_PATH: &str = "/Story/All";
/// Route that edits a story.
pub const EDIT_STORY_PATH: &str = "/Story/Edit";
/// Route that deletes a story.
pub const DELETE_STORY_PATH: &str = "/Story/Delete";
/// Route that issues a JWT.
pub const LOGIN_PATH: &str = "/User/Login";

/// Message returned after a successful create.
pub const CREATED_MSG: &str = "Successfully created!";
/// Message returned after a successful edit.
pub const EDITED_MSG: &str = "Edited successfully";
/// Text contained in a successful delete response.
pub const DELETED_MSG: &str = "The story is deleted!";
/// Text contained in responses for unknown story ids.
pub const NO_SUCH_STORY_MSG: &str = "There is no such story!";

/// Title of the story created by the first case.
pub const CREATED_STORY_TITLE: &str = "My First Story";

/// Knobs of the Story plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Id used by the non-existing story checks.
    pub non_existing_story_id: String,
    /// How the list case picks the story to edit and delete.
    pub locator: StoryLocator,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            non_existing_story_id: "123".to_string(),
            locator: StoryLocator::Last,
        }
    }
}

/// Cases ordered by sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePlan {
    cases: Vec<CaseSpec>,
}

impl CasePlan {
    /// Creates a plan, sorting cases by sequence number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPlan` if the plan is empty or two cases
    /// share a sequence number.
    pub fn new(mut cases: Vec<CaseSpec>) -> DomainResult<Self> {
        if cases.is_empty() {
            return Err(DomainError::InvalidPlan("plan has no cases".to_string()));
        }
        cases.sort_by_key(|case| case.sequence);
        if let Some(pair) = cases
            .windows(2)
            .find(|pair| pair[0].sequence == pair[1].sequence)
        {
            return Err(DomainError::InvalidPlan(format!(
                "sequence {} is used by '{}' and '{}'",
                pair[0].sequence, pair[0].name, pair[1].name
            )));
        }
        Ok(Self { cases })
    }

    /// Returns the cases in execution order.
    #[must_use]
    pub fn cases(&self) -> &[CaseSpec] {
        &self.cases
    }

    /// Returns the number of cases.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if there are no cases. Never true for a constructed plan.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Returns a plan holding only the cases whose sequence is in `sequences`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPlan` if nothing is left.
    pub fn only(&self, sequences: &[u8]) -> DomainResult<Self> {
        Self::new(
            self.cases
                .iter()
                .filter(|case| sequences.contains(&case.sequence))
                .cloned()
                .collect(),
        )
    }
}

/// Builds the seven ordered Story API cases.
///
/// # Errors
///
/// Never fails for the built-in cases; the `Result` comes from plan validation.
pub fn story_crud_plan(options: &PlanOptions) -> DomainResult<CasePlan> {
    let missing = StoryIdSource::Fixed(options.non_existing_story_id.clone());

    CasePlan::new(vec![
        CaseSpec::new(1, "Create story", HttpMethod::Post, ADD_STORY_PATH)
            .with_body(
                StoryPayload::new(CREATED_STORY_TITLE, "This is a test story created via API")
                    .with_status("Pending"),
            )
            .with_assertion(Assertion::BodyNotEmpty)
            .with_assertion(Assertion::status(200))
            .with_assertion(Assertion::json_equals("$.msg", json!(CREATED_MSG))),
        CaseSpec::new(2, "List stories", HttpMethod::Get, ALL_STORIES_PATH)
            .with_assertion(Assertion::status(200))
            .with_assertion(Assertion::JsonArrayNotEmpty {
                path: "$".to_string(),
            })
            .with_capture(Capture::StoryId {
                locator: options.locator,
                title: CREATED_STORY_TITLE.to_string(),
            }),
        CaseSpec::new(3, "Edit story", HttpMethod::Put, EDIT_STORY_PATH)
            .with_story_id(StoryIdSource::Captured)
            .with_body(
                StoryPayload::new("Edited Story Title", "This story has been updated")
                    .with_status("InProgress"),
            )
            .with_assertion(Assertion::status(200))
            .with_assertion(Assertion::json_equals("$.msg", json!(EDITED_MSG))),
        CaseSpec::new(4, "Delete story", HttpMethod::Delete, DELETE_STORY_PATH)
            .with_story_id(StoryIdSource::Captured)
            .with_assertion(Assertion::status(200))
            .with_assertion(Assertion::body_contains(DELETED_MSG)),
        CaseSpec::new(
            5,
            "Create story without required fields",
            HttpMethod::Post,
            ADD_STORY_PATH,
        )
        .with_body(StoryPayload::new("", ""))
        .with_assertion(Assertion::status(400)),
        CaseSpec::new(6, "Edit non-existing story", HttpMethod::Put, EDIT_STORY_PATH)
            .with_story_id(missing.clone())
            .with_body(StoryPayload::new(
                "FakeStory",
                "Trying to edit non-existing story",
            ))
            .with_assertion(Assertion::status(400))
            .with_assertion(Assertion::body_contains(NO_SUCH_STORY_MSG)),
        CaseSpec::new(
            7,
            "Delete non-existing story",
            HttpMethod::Delete,
            DELETE_STORY_PATH,
        )
        .with_story_id(missing)
        .with_assertion(Assertion::status(400))
        .with_assertion(Assertion::body_contains(NO_SUCH_STORY_MSG)),
    ])
}
