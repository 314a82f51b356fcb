//! HTTP Response domain types

mod spec;

pub use spec::{ResponseSpec, reason_phrase};
