//! Shared HTTP plumbing for every adapter.
//!
//! [`HttpTransport`] performs one GET with a deadline and folds every
//! failure (transport, non-2xx, timeout) into a [`ProviderOutcome`].
//! [`UpstreamSettings`] merges user overrides with an adapter's defaults.

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use promptgate_core::config::schema::UpstreamConfig;
use promptgate_core::utils::truncate_string;
use promptgate_core::ErrorKind;

use crate::traits::{ProviderOutcome, ProviderRequest};

/// Longest slice of an error body copied into failure details.
const ERROR_BODY_PREVIEW: usize = 200;

/// Failure while constructing an adapter (bad config, TLS setup).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid base URL for {provider}: '{url}' ({reason})")]
    InvalidBaseUrl {
        provider: &'static str,
        url: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// ─────────────────────────────────────────────
// UpstreamSettings
// ─────────────────────────────────────────────

/// Built-in defaults for one provider class.
#[derive(Clone, Copy, Debug)]
pub struct UpstreamDefaults {
    pub api_base: &'static str,
    pub api_key: Option<&'static str>,
    pub timeout: Duration,
}

/// Effective settings: config override > adapter default.
#[derive(Clone)]
pub struct UpstreamSettings {
    pub base: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl UpstreamSettings {
    pub fn resolve(
        provider: &'static str,
        config: &UpstreamConfig,
        defaults: UpstreamDefaults,
    ) -> Result<Self, AdapterError> {
        let raw_base = config.api_base.as_deref().unwrap_or(defaults.api_base);
        let base = Url::parse(raw_base).map_err(|e| AdapterError::InvalidBaseUrl {
            provider,
            url: raw_base.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(AdapterError::InvalidBaseUrl {
                provider,
                url: raw_base.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }

        // An explicitly empty key disables the default credential.
        let api_key = match config.api_key.as_deref() {
            Some("") => None,
            Some(key) => Some(key.to_string()),
            None => defaults.api_key.map(String::from),
        };

        let timeout = config
            .timeout()
            .filter(|t| !t.is_zero())
            .unwrap_or(defaults.timeout);

        Ok(Self {
            base,
            api_key,
            timeout,
        })
    }
}

impl std::fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("base", &self.base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ─────────────────────────────────────────────
// HttpTransport
// ─────────────────────────────────────────────

/// Connection-pooled HTTP client shared by an adapter.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Execute one GET request for `provider`.
    pub async fn execute(&self, provider: &str, request: &ProviderRequest) -> ProviderOutcome {
        debug!(provider, url = %request.redacted_url(), "Calling upstream");

        let result = self
            .client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout)
            .send()
            .await;

        let response = match result {
            Ok(resp) => resp,
            Err(e) => return transport_failure(provider, request, e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider, status = %status, "Upstream returned an error status");
            let mut detail = format!("HTTP {}", status.as_u16());
            let body = body.trim();
            if !body.is_empty() {
                detail.push_str(": ");
                detail.push_str(&truncate_string(body, ERROR_BODY_PREVIEW));
            }
            return ProviderOutcome::failure(ErrorKind::UpstreamError, detail);
        }

        match response.text().await {
            Ok(text) => ProviderOutcome::success(parse_body(text)),
            Err(e) => transport_failure(provider, request, e),
        }
    }
}

/// JSON when the body parses as JSON, a JSON string otherwise.
/// Blank bodies become `null`.
pub fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn transport_failure(
    provider: &str,
    request: &ProviderRequest,
    e: reqwest::Error,
) -> ProviderOutcome {
    if e.is_timeout() {
        warn!(provider, timeout = ?request.timeout, "Upstream timed out");
        return ProviderOutcome::failure(
            ErrorKind::UpstreamTimeout,
            format!("timed out after {}ms", request.timeout.as_millis()),
        );
    }
    // reqwest's Display includes the URL, which may carry a credential.
    let e = e.without_url();
    error!(provider, error = %e, "Upstream request failed");
    ProviderOutcome::failure(ErrorKind::UpstreamError, e.to_string())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
