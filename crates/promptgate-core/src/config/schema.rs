//! Configuration schema.
//!
//! Hierarchy: `Config` → `ServerConfig`, `ProvidersConfig`, `DispatchConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.promptgate/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub dispatch: DispatchConfig,
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 25586,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Overrides for one upstream provider.
///
/// Every field is optional; unset fields fall back to the adapter's
/// built-in defaults.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Credential appended to every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-call deadline in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    /// Whether a non-empty credential is configured.
    pub fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &if self.has_key() { "<set>" } else { "<unset>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// One `UpstreamConfig` per provider class.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    /// The always-available text provider, also the fallback target.
    pub default: UpstreamConfig,
    /// Shared multi-model gateway, model id as path segment.
    pub pooled: UpstreamConfig,
    /// Image-text endpoint.
    pub image: UpstreamConfig,
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

/// Routing and budget settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchConfig {
    /// Model used when a request names none.
    pub default_model: String,
    /// Budget for primary + fallback attempts together.
    pub request_timeout_secs: u64,
    /// Deadline for the dedicated `/api/image` endpoint.
    pub image_endpoint_timeout_secs: u64,
    /// Maximum prompts in flight for one batch request.
    pub batch_concurrency: usize,
}

impl DispatchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn image_endpoint_timeout(&self) -> Duration {
        Duration::from_secs(self.image_endpoint_timeout_secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_model: "dtempire".to_string(),
            request_timeout_secs: 30,
            image_endpoint_timeout_secs: 15,
            batch_concurrency: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 25586);
        assert_eq!(config.dispatch.default_model, "dtempire");
        assert_eq!(config.dispatch.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.dispatch.image_endpoint_timeout(), Duration::from_secs(15));
        assert!(config.providers.pooled.api_base.is_none());
        assert!(config.providers.default.timeout().is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"providers": {"pooled": {"apiKey": "abc", "timeoutSecs": 4}}}"#)
                .unwrap();
        assert!(config.providers.pooled.has_key());
        assert_eq!(config.providers.pooled.timeout(), Some(Duration::from_secs(4)));
        assert!(config.providers.pooled.api_base.is_none());
        assert_eq!(config.dispatch.batch_concurrency, 4);
    }

    #[test]
    fn test_empty_key_is_not_set() {
        let upstream = UpstreamConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!upstream.has_key());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let upstream = UpstreamConfig {
            api_base: Some("https://x".to_string()),
            api_key: Some("super-secret".to_string()),
            timeout_secs: Some(5),
        };
        let rendered = format!("{upstream:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<set>"));
    }
}
