//! Error kinds shared across the dispatch pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of every failure the gateway can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing/blank prompt or unknown model, rejected before any network call.
    Validation,
    /// An upstream call exceeded its deadline.
    UpstreamTimeout,
    /// Non-2xx status or transport-level failure.
    UpstreamError,
    /// The raw body could not be turned into text at all.
    NormalizationFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::UpstreamTimeout => "upstream_timeout",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::NormalizationFailure => "normalization_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound request rejected before dispatch.
///
/// The `Display` output is the user-facing message placed in the
/// `error` field of the JSON envelope.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a prompt")]
    EmptyPrompt,

    #[error("Invalid model '{model}'. Available: {}", available.join(", "))]
    UnknownModel {
        model: String,
        available: Vec<String>,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
