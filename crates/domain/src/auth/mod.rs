//! Authentication domain types

mod types;

pub use types::{AccessToken, Credentials, TokenSource};
