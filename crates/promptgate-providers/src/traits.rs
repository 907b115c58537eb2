//! Provider adapter trait: the seam between dispatch and the network.
//!
//! Every upstream class (default, pooled, image) implements
//! [`ProviderAdapter`]. Adapters never return errors: every failure is
//! folded into a [`ProviderOutcome::Failure`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde_json::Value;

use promptgate_core::{ErrorKind, RequestContext};

/// Query parameters whose values must never reach logs.
const SECRET_PARAMS: &[&str] = &["key", "token", "api_key"];

// ─────────────────────────────────────────────
// ProviderRequest
// ─────────────────────────────────────────────

/// A fully-built upstream call: URL (with query), headers and deadline.
#[derive(Clone)]
pub struct ProviderRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl ProviderRequest {
    /// The URL with credential query values replaced by `***`.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let value = if SECRET_PARAMS.contains(&k.as_ref()) {
                    "***".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), value)
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url.to_string()
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

impl std::fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("url", &self.redacted_url())
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ─────────────────────────────────────────────
// ProviderOutcome
// ─────────────────────────────────────────────

/// Result of exactly one upstream call.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderOutcome {
    /// 2xx response. The body is JSON when it parses, otherwise a JSON string.
    Success { raw_body: Value },
    Failure { kind: ErrorKind, detail: String },
}

impl ProviderOutcome {
    pub fn success(raw_body: Value) -> Self {
        ProviderOutcome::Success { raw_body }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        ProviderOutcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderOutcome::Success { .. })
    }
}

// ─────────────────────────────────────────────
// ProviderAdapter
// ─────────────────────────────────────────────

/// One implementation per provider class.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short provider name used in source tags and logs (e.g. `"raqkid"`).
    fn name(&self) -> &str;

    /// Source tag for a direct (non-fallback) answer.
    fn source(&self) -> String {
        format!("{}_api", self.name())
    }

    /// Build the upstream request. Pure: same context, same request.
    fn build_request(&self, ctx: &RequestContext) -> ProviderRequest;

    /// Perform one network call. Never panics or errors past this boundary.
    async fn invoke(&self, request: &ProviderRequest) -> ProviderOutcome;

    /// `build_request` followed by `invoke`.
    async fn call(&self, ctx: &RequestContext) -> ProviderOutcome {
        let request = self.build_request(ctx);
        self.invoke(&request).await
    }
}
