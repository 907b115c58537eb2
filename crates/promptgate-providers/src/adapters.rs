//! The three concrete provider adapters and the set that selects between them.
//!
//! | Class      | Adapter            | URL shape                                  |
//! |------------|--------------------|--------------------------------------------|
//! | `Default`  | [`DefaultAdapter`] | `{base}?prompt=..[&temperature][&max_tokens][&token]` |
//! | `Pooled`   | [`PooledAdapter`]  | `{base}/{model}?prompt=..[&temperature][&max_tokens]&key=..` |
//! | `ImageGen` | [`ImageGenAdapter`]| `{base}/?prompt=..`                        |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Url;

use promptgate_core::config::schema::ProvidersConfig;
use promptgate_core::RequestContext;

use crate::http_provider::{AdapterError, HttpTransport, UpstreamDefaults, UpstreamSettings};
use crate::registry::ProviderClass;
use crate::traits::{ProviderAdapter, ProviderOutcome, ProviderRequest};

/// Append `temperature` / `max_tokens` when the caller supplied them.
fn append_options(url: &mut Url, ctx: &RequestContext) {
    let mut query = url.query_pairs_mut();
    if let Some(temperature) = ctx.temperature {
        query.append_pair("temperature", &temperature.to_string());
    }
    if let Some(max_tokens) = ctx.max_tokens {
        query.append_pair("max_tokens", &max_tokens.to_string());
    }
}

fn json_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

// ─────────────────────────────────────────────
// DefaultAdapter
// ─────────────────────────────────────────────

/// The guaranteed-available text provider.
///
/// Serves the default model directly and every pooled-model fallback.
#[derive(Debug)]
pub struct DefaultAdapter {
    settings: UpstreamSettings,
    transport: HttpTransport,
}

impl DefaultAdapter {
    pub const NAME: &'static str = "dtempire";
    pub const DEFAULTS: UpstreamDefaults = UpstreamDefaults {
        api_base: "http://158.69.214.8:9853/dtempire-ai",
        api_key: None,
        timeout: Duration::from_secs(8),
    };

    pub fn new(settings: UpstreamSettings) -> Result<Self, AdapterError> {
        Ok(Self {
            settings,
            transport: HttpTransport::new()?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for DefaultAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build_request(&self, ctx: &RequestContext) -> ProviderRequest {
        let mut url = self.settings.base.clone();
        url.query_pairs_mut().append_pair("prompt", &ctx.prompt);
        append_options(&mut url, ctx);
        if let Some(ref token) = self.settings.api_key {
            url.query_pairs_mut().append_pair("token", token);
        }

        ProviderRequest {
            url,
            headers: json_headers("PromptGate/1.0"),
            timeout: self.settings.timeout,
        }
    }

    async fn invoke(&self, request: &ProviderRequest) -> ProviderOutcome {
        self.transport.execute(Self::NAME, request).await
    }
}

// ─────────────────────────────────────────────
// PooledAdapter
// ─────────────────────────────────────────────

/// Shared multi-model gateway; the model id becomes a path segment.
#[derive(Debug)]
pub struct PooledAdapter {
    settings: UpstreamSettings,
    transport: HttpTransport,
}

impl PooledAdapter {
    pub const NAME: &'static str = "raqkid";
    pub const DEFAULTS: UpstreamDefaults = UpstreamDefaults {
        api_base: "https://raqkidapiendpoint.vercel.app",
        api_key: Some("Raqkid3Y0mT_free"),
        timeout: Duration::from_secs(10),
    };

    pub fn new(settings: UpstreamSettings) -> Result<Self, AdapterError> {
        Ok(Self {
            settings,
            transport: HttpTransport::new()?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for PooledAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build_request(&self, ctx: &RequestContext) -> ProviderRequest {
        let mut url = self.settings.base.clone();
        // Base URLs are checked to accept path segments at construction.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&ctx.model_id);
        }
        url.query_pairs_mut().append_pair("prompt", &ctx.prompt);
        append_options(&mut url, ctx);
        if let Some(ref key) = self.settings.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        ProviderRequest {
            url,
            headers: json_headers("DTempire-AI"),
            timeout: self.settings.timeout,
        }
    }

    async fn invoke(&self, request: &ProviderRequest) -> ProviderOutcome {
        self.transport.execute(Self::NAME, request).await
    }
}

// ─────────────────────────────────────────────
// ImageGenAdapter
// ─────────────────────────────────────────────

/// Single external image-text endpoint. Only the prompt is forwarded.
#[derive(Debug)]
pub struct ImageGenAdapter {
    settings: UpstreamSettings,
    transport: HttpTransport,
}

impl ImageGenAdapter {
    pub const NAME: &'static str = "image";
    pub const DEFAULTS: UpstreamDefaults = UpstreamDefaults {
        api_base: "https://imggen-api.ankitgupta.com.np/api/ai-text",
        api_key: None,
        timeout: Duration::from_secs(10),
    };

    pub fn new(settings: UpstreamSettings) -> Result<Self, AdapterError> {
        Ok(Self {
            settings,
            transport: HttpTransport::new()?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for ImageGenAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build_request(&self, ctx: &RequestContext) -> ProviderRequest {
        let mut url = self.settings.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("");
        }
        url.query_pairs_mut().append_pair("prompt", &ctx.prompt);
        if let Some(ref key) = self.settings.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        ProviderRequest {
            url,
            headers: json_headers("PromptGate/1.0"),
            timeout: self.settings.timeout,
        }
    }

    async fn invoke(&self, request: &ProviderRequest) -> ProviderOutcome {
        self.transport.execute(Self::NAME, request).await
    }
}

// ─────────────────────────────────────────────
// AdapterSet
// ─────────────────────────────────────────────

/// One adapter per provider class, shared across requests.
#[derive(Clone)]
pub struct AdapterSet {
    pub default: Arc<dyn ProviderAdapter>,
    pub pooled: Arc<dyn ProviderAdapter>,
    pub image: Arc<dyn ProviderAdapter>,
}

impl AdapterSet {
    /// Build the three HTTP adapters from config overrides + built-in defaults.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, AdapterError> {
        let default = DefaultAdapter::new(UpstreamSettings::resolve(
            DefaultAdapter::NAME,
            &config.default,
            DefaultAdapter::DEFAULTS,
        )?)?;
        let pooled = PooledAdapter::new(UpstreamSettings::resolve(
            PooledAdapter::NAME,
            &config.pooled,
            PooledAdapter::DEFAULTS,
        )?)?;
        let image = ImageGenAdapter::new(UpstreamSettings::resolve(
            ImageGenAdapter::NAME,
            &config.image,
            ImageGenAdapter::DEFAULTS,
        )?)?;

        Ok(Self {
            default: Arc::new(default),
            pooled: Arc::new(pooled),
            image: Arc::new(image),
        })
    }

    /// The adapter serving a provider class.
    pub fn for_class(&self, class: ProviderClass) -> &Arc<dyn ProviderAdapter> {
        match class {
            ProviderClass::Default => &self.default,
            ProviderClass::Pooled => &self.pooled,
            ProviderClass::ImageGen => &self.image,
        }
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSet")
            .field("default", &self.default.name())
            .field("pooled", &self.pooled.name())
            .field("image", &self.image.name())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
