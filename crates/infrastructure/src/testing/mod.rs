//! Response testing infrastructure.
//!
//! This module provides the runner that executes assertions against HTTP responses.

mod runner;

pub use runner::AssertionRunner;
