//! JSON response bodies.

use serde::{Serialize, Serializer};

use promptgate_core::utils::timestamp;
use promptgate_core::NormalizedResult;
use promptgate_providers::ModelRegistry;

use crate::gateway::{BatchItem, GatewayError};

/// Successful `/ai` and `/api/image` body.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
    pub model: String,
    pub source: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<String>,
    pub timestamp: String,
}

impl From<NormalizedResult> for Success {
    fn from(result: NormalizedResult) -> Self {
        Self {
            success: true,
            model: result.model,
            source: result.source_provider,
            response: result.text,
            fallback_from: result.fallback_from,
            timestamp: timestamp(),
        }
    }
}

/// `/api/image` body; the model is implied by the route.
#[derive(Debug, Serialize)]
pub struct Image {
    pub success: bool,
    pub source: String,
    pub response: String,
    pub timestamp: String,
}

impl From<NormalizedResult> for Image {
    fn from(result: NormalizedResult) -> Self {
        Self {
            success: true,
            source: result.source_provider,
            response: result.text,
            timestamp: timestamp(),
        }
    }
}

/// Uniform failure body.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            timestamp: timestamp(),
        }
    }
}

impl From<&GatewayError> for Failure {
    fn from(err: &GatewayError) -> Self {
        Self {
            details: err.details(),
            ..Self::new(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub prompt: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BatchItem> for BatchEntry {
    fn from(item: BatchItem) -> Self {
        match item.outcome {
            Ok(result) => Self {
                prompt: item.prompt,
                success: true,
                response: Some(result.text),
                error: None,
            },
            Err(e) => Self {
                prompt: item.prompt,
                success: false,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Batch {
    pub success: bool,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
    pub timestamp: String,
}

impl Batch {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let results: Vec<BatchEntry> = items.into_iter().map(BatchEntry::from).collect();
        let processed = results.iter().filter(|r| r.success).count();
        Self {
            success: true,
            total: results.len(),
            processed,
            failed: results.len() - processed,
            results,
            timestamp: timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Models {
    pub success: bool,
    /// `id → display name`, serialized as an object in registry order.
    #[serde(serialize_with = "ordered_map")]
    pub models: Vec<(&'static str, &'static str)>,
    pub default_model: String,
    pub timestamp: String,
}

impl Models {
    pub fn new(registry: &ModelRegistry, default_model: &str) -> Self {
        Self {
            success: true,
            models: registry.iter().map(|m| (m.id, m.display_name)).collect(),
            default_model: default_model.to_string(),
            timestamp: timestamp(),
        }
    }
}

fn ordered_map<S: Serializer>(
    entries: &[(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().copied())
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: String,
    pub models: usize,
    /// Seconds since the server started.
    pub uptime: f64,
    pub timestamp: String,
}
