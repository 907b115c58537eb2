//! Request and result types that flow through the dispatch pipeline.
//!
//! A [`RequestContext`] is created per inbound call and never shared; a
//! [`NormalizedResult`] is the terminal value handed back to the router.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ─────────────────────────────────────────────
// RequestContext
// ─────────────────────────────────────────────

/// Everything an adapter needs to build one upstream request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Trimmed, non-empty prompt text.
    pub prompt: String,
    /// Model identifier, already checked against the registry by the caller.
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl RequestContext {
    /// Build a context, rejecting blank prompts.
    pub fn new(
        prompt: impl AsRef<str>,
        model_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let prompt = prompt.as_ref().trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        Ok(Self {
            prompt: prompt.to_string(),
            model_id: model_id.into(),
            temperature: None,
            max_tokens: None,
        })
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Same prompt and options, targeted at another model.
    ///
    /// Used when retrying against the default provider.
    pub fn retarget(&self, model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            ..self.clone()
        }
    }
}

// ─────────────────────────────────────────────
// NormalizedResult
// ─────────────────────────────────────────────

/// Plain-text answer plus the identity of the provider that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Model that actually answered (the default model after a fallback).
    pub model: String,
    /// Always a plain string, never a stringified `null`.
    pub text: String,
    /// Source tag, e.g. `"raqkid_api"` or `"dtempire_fallback"`.
    pub source_provider: String,
    pub used_fallback: bool,
    /// The originally requested model when `used_fallback` is set.
    pub fallback_from: Option<String>,
}
