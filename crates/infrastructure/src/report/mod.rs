//! Run report output.
//!
//! Console summary for humans and deterministic JSON for CI artifacts.

mod console;
mod json;

pub use console::{Summary, render_summary};
pub use json::{SerializationError, to_json_stable, write_json_report};
