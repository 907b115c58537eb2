//! Core building blocks shared by every PromptGate crate.
//!
//! - [`types`]: per-request context and the normalized result handed back to callers
//! - [`error`]: error kinds and validation errors
//! - [`config`]: typed configuration, JSON file + env var loading
//! - [`utils`]: timestamps, data paths, chat-safe truncation

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{ErrorKind, ValidationError};
pub use types::{NormalizedResult, RequestContext};
