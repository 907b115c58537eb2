//! Request router: validation, dispatch and batch fan-out.
//!
//! Transport-agnostic: the HTTP handlers and the `ask` command both go
//! through [`Gateway`], so validation rules live in exactly one place.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use promptgate_core::config::schema::DispatchConfig;
use promptgate_core::config::Config;
use promptgate_core::{ErrorKind, NormalizedResult, RequestContext, ValidationError};
use promptgate_providers::{
    AdapterError, AdapterSet, DispatchError, Dispatcher, ImageGenAdapter, ModelRegistry,
};

/// Everything the router can reject or fail with.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(e) => e.kind(),
            GatewayError::Dispatch(e) => e.kind(),
        }
    }

    /// Raw upstream reasons, if the failure came from upstream.
    pub fn details(&self) -> Option<String> {
        match self {
            GatewayError::Validation(_) => None,
            GatewayError::Dispatch(e) => Some(e.details()),
        }
    }

    /// Missing or blank prompt.
    pub fn is_missing_prompt(&self) -> bool {
        matches!(self, GatewayError::Validation(ValidationError::EmptyPrompt))
    }
}

/// Raw inbound fields before validation.
#[derive(Clone, Debug, Default)]
pub struct PromptInput {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl PromptInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// One prompt's outcome inside a batch, in input order.
#[derive(Clone, Debug)]
pub struct BatchItem {
    pub prompt: String,
    pub outcome: Result<NormalizedResult, GatewayError>,
}

/// Validates requests against the registry and hands them to the dispatcher.
#[derive(Clone, Debug)]
pub struct Gateway {
    registry: ModelRegistry,
    dispatcher: Dispatcher,
    settings: DispatchConfig,
}

impl Gateway {
    pub fn new(registry: ModelRegistry, dispatcher: Dispatcher, settings: DispatchConfig) -> Self {
        Self {
            registry,
            dispatcher,
            settings,
        }
    }

    /// Build the built-in registry and HTTP adapters from config.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        let adapters = AdapterSet::from_config(&config.providers)?;
        let dispatcher = Dispatcher::new(adapters, config.dispatch.request_timeout());
        let registry = ModelRegistry::builtin();
        if !registry.contains(&config.dispatch.default_model) {
            warn!(
                model = %config.dispatch.default_model,
                "Configured default model is not in the registry; requests without a model will be rejected"
            );
        }
        Ok(Self::new(registry, dispatcher, config.dispatch.clone()))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn default_model(&self) -> &str {
        &self.settings.default_model
    }

    /// Validate then dispatch one prompt.
    ///
    /// Validation happens before any adapter is touched: a blank prompt or
    /// an unknown model never reaches the network.
    pub async fn ask(&self, input: PromptInput) -> Result<NormalizedResult, GatewayError> {
        let model_id = input
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_model.clone());

        let ctx = RequestContext::new(input.prompt.as_deref().unwrap_or_default(), &model_id)?
            .with_temperature(input.temperature)
            .with_max_tokens(input.max_tokens);
        let descriptor = self.registry.resolve(&model_id)?;

        let result = self.dispatcher.dispatch(descriptor, &ctx).await?;
        info!(
            model = %result.model,
            source = %result.source_provider,
            fallback = result.used_fallback,
            chars = result.text.chars().count(),
            "Request completed"
        );
        Ok(result)
    }

    /// Dedicated image endpoint: prompt only, longer deadline, no fallback.
    pub async fn image(&self, prompt: Option<&str>) -> Result<NormalizedResult, GatewayError> {
        let ctx = RequestContext::new(prompt.unwrap_or_default(), ImageGenAdapter::NAME)?;
        let timeout = self.image_timeout();
        Ok(self.dispatcher.generate_image(&ctx, timeout).await?)
    }

    /// Run every prompt independently with bounded parallelism.
    ///
    /// Results keep input order regardless of completion order.
    pub async fn batch(&self, prompts: Vec<String>, model: Option<String>) -> Vec<BatchItem> {
        let concurrency = self.settings.batch_concurrency.max(1);
        debug!(total = prompts.len(), concurrency, "Processing batch");

        stream::iter(prompts)
            .map(|prompt| {
                let input = PromptInput::new(prompt.clone()).with_model(model.clone());
                async move {
                    let outcome = self.ask(input).await;
                    if let Err(ref e) = outcome {
                        debug!(error = %e, "Batch item failed");
                    }
                    BatchItem { prompt, outcome }
                }
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    fn image_timeout(&self) -> Duration {
        let timeout = self.settings.image_endpoint_timeout();
        if timeout.is_zero() {
            Duration::from_secs(15)
        } else {
            timeout
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
