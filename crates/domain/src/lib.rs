//! Storycheck Domain - Core types
//!
//! This crate defines the domain model of the Story API test runner:
//! wire payloads, request and response specs, assertions, the ordered
//! case plan and run reports. All types here are pure Rust with no I/O.

pub mod auth;
pub mod case;
pub mod error;
pub mod plan;
pub mod report;
pub mod request;
pub mod response;
pub mod story;
pub mod testing;

pub use auth::{AccessToken, Credentials, TokenSource};
pub use case::{Capture, CaseSpec, RunContext, STORY_ID_PARAM, StoryIdSource};
pub use error::{DomainError, DomainResult};
pub use plan::{CasePlan, PlanOptions, story_crud_plan};
pub use report::{CaseOutcome, CaseReport, RunReport};
pub use story::{
    ApiResponseEnvelope, LoginRequest, LoginResponse, StoryCreateRequest, StoryEditRequest,
    StoryLocator, StoryPayload, StoryRecord,
};
pub use testing::{Assertion, AssertionResult};
