//! Response verification port

use storycheck_domain::{Assertion, AssertionResult, response::ResponseSpec};

/// Port for checking a response against a case's assertions.
pub trait ResponseVerifier: Send + Sync {
    /// Runs every assertion against `response`, in order, and returns one
    /// result per assertion.
    fn verify(&self, assertions: &[Assertion], response: &ResponseSpec) -> Vec<AssertionResult>;
}
