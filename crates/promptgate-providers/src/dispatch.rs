//! Fallback controller: one primary attempt, at most one fallback hop.
//!
//! ```text
//! Idle ─▶ Attempting(primary) ─┬─▶ Success
//!                              └─▶ Attempting(fallback) ─┬─▶ Success
//!                                   (pooled models only) └─▶ Failed
//! ```
//!
//! Default and image models have no fallback target: a primary failure is
//! terminal. The whole sequence runs under one overall time budget.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use promptgate_core::utils::truncate_string;
use promptgate_core::{ErrorKind, NormalizedResult, RequestContext};

use crate::adapters::AdapterSet;
use crate::normalize::normalize;
use crate::registry::{ModelDescriptor, ProviderClass, DEFAULT_MODEL_ID};
use crate::traits::{ProviderAdapter, ProviderOutcome};

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Why one attempt against one provider failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider: String,
    pub kind: ErrorKind,
    pub detail: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.detail)
    }
}

/// Terminal failure of a dispatch.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Every available attempt failed (one, or primary + fallback).
    #[error("{}", exhausted_message(model, attempts))]
    Exhausted {
        model: String,
        attempts: Vec<AttemptFailure>,
    },

    /// The overall budget ran out during the primary attempt.
    #[error("Request for model '{model}' timed out after {}ms", budget.as_millis())]
    BudgetExceeded { model: String, budget: Duration },
}

fn exhausted_message(model: &str, attempts: &[AttemptFailure]) -> String {
    let reasons = join_attempts(attempts);
    if attempts.len() > 1 {
        format!("All providers failed for model '{model}': {reasons}")
    } else {
        format!("Request for model '{model}' failed: {reasons}")
    }
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DispatchError {
    /// Kind of the last failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Exhausted { attempts, .. } => attempts
                .last()
                .map(|a| a.kind)
                .unwrap_or(ErrorKind::UpstreamError),
            DispatchError::BudgetExceeded { .. } => ErrorKind::UpstreamTimeout,
        }
    }

    /// Raw upstream reasons, suitable for the `details` envelope field.
    pub fn details(&self) -> String {
        match self {
            DispatchError::Exhausted { attempts, .. } => join_attempts(attempts),
            DispatchError::BudgetExceeded { budget, .. } => {
                format!("overall budget of {}ms exceeded", budget.as_millis())
            }
        }
    }

    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            DispatchError::Exhausted { attempts, .. } => attempts,
            DispatchError::BudgetExceeded { .. } => &[],
        }
    }
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

/// Runs requests against the adapter for their provider class and falls
/// back to the default provider for pooled models.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    adapters: AdapterSet,
    budget: Duration,
}

impl Dispatcher {
    pub fn new(adapters: AdapterSet, budget: Duration) -> Self {
        Self { adapters, budget }
    }

    /// Dispatch a validated request for a resolved model.
    pub async fn dispatch(
        &self,
        descriptor: &ModelDescriptor,
        ctx: &RequestContext,
    ) -> Result<NormalizedResult, DispatchError> {
        info!(
            model = descriptor.id,
            class = descriptor.provider_class.as_str(),
            prompt = %truncate_string(&ctx.prompt, 50),
            "Dispatching request"
        );

        let deadline = Instant::now() + self.budget;
        self.run(descriptor, ctx, deadline).await
    }

    /// Single image-generation attempt with an explicit deadline.
    ///
    /// Backs the dedicated image endpoint; never falls back.
    pub async fn generate_image(
        &self,
        ctx: &RequestContext,
        timeout: Duration,
    ) -> Result<NormalizedResult, DispatchError> {
        let adapter = self.adapters.for_class(ProviderClass::ImageGen);
        let mut request = adapter.build_request(ctx);
        request.timeout = timeout;

        match adapter.invoke(&request).await {
            ProviderOutcome::Success { raw_body } => Ok(NormalizedResult {
                model: ctx.model_id.clone(),
                text: normalize(&raw_body),
                source_provider: adapter.source(),
                used_fallback: false,
                fallback_from: None,
            }),
            ProviderOutcome::Failure { kind, detail } => Err(DispatchError::Exhausted {
                model: ctx.model_id.clone(),
                attempts: vec![AttemptFailure {
                    provider: adapter.name().to_string(),
                    kind,
                    detail,
                }],
            }),
        }
    }

    /// Primary attempt, then the fallback hop if the class has one. Both
    /// hops share `deadline`.
    async fn run(
        &self,
        descriptor: &ModelDescriptor,
        ctx: &RequestContext,
        deadline: Instant,
    ) -> Result<NormalizedResult, DispatchError> {
        let class = descriptor.provider_class;
        let primary = self.adapters.for_class(class);

        let primary_failure = match timeout_at(deadline, attempt(primary.as_ref(), ctx)).await {
            Ok(Ok(text)) => {
                return Ok(NormalizedResult {
                    model: ctx.model_id.clone(),
                    text,
                    source_provider: primary.source(),
                    used_fallback: false,
                    fallback_from: None,
                })
            }
            Ok(Err(failure)) => failure,
            Err(_) => {
                warn!(model = descriptor.id, budget = ?self.budget, "Dispatch budget exceeded");
                return Err(DispatchError::BudgetExceeded {
                    model: ctx.model_id.clone(),
                    budget: self.budget,
                });
            }
        };

        let Some(fallback_class) = class.fallback() else {
            return Err(DispatchError::Exhausted {
                model: ctx.model_id.clone(),
                attempts: vec![primary_failure],
            });
        };

        let fallback = self.adapters.for_class(fallback_class);
        warn!(
            model = descriptor.id,
            from = primary.name(),
            to = fallback.name(),
            reason = %primary_failure.detail,
            "Primary provider failed, falling back"
        );

        let fallback_ctx = ctx.retarget(DEFAULT_MODEL_ID);
        let fallback_failure =
            match timeout_at(deadline, attempt(fallback.as_ref(), &fallback_ctx)).await {
                Ok(Ok(text)) => {
                    return Ok(NormalizedResult {
                        model: fallback_ctx.model_id,
                        text,
                        source_provider: format!("{}_fallback", fallback.name()),
                        used_fallback: true,
                        fallback_from: Some(ctx.model_id.clone()),
                    })
                }
                Ok(Err(failure)) => failure,
                Err(_) => {
                    warn!(model = descriptor.id, budget = ?self.budget, "Budget ran out during fallback");
                    AttemptFailure {
                        provider: fallback.name().to_string(),
                        kind: ErrorKind::UpstreamTimeout,
                        detail: format!("overall budget of {}ms exceeded", self.budget.as_millis()),
                    }
                }
            };

        Err(DispatchError::Exhausted {
            model: ctx.model_id.clone(),
            attempts: vec![primary_failure, fallback_failure],
        })
    }
}

/// One adapter call, normalized on success.
async fn attempt(
    adapter: &dyn ProviderAdapter,
    ctx: &RequestContext,
) -> Result<String, AttemptFailure> {
    match adapter.call(ctx).await {
        ProviderOutcome::Success { raw_body } => Ok(normalize(&raw_body)),
        ProviderOutcome::Failure { kind, detail } => Err(AttemptFailure {
            provider: adapter.name().to_string(),
            kind,
            detail,
        }),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
