//! Model registry: static table of every model identifier the gateway serves.
//!
//! Each `ModelDescriptor` maps an id to a display name and the provider
//! class that handles it. The table never changes at runtime; the
//! [`ModelRegistry`] index over it is built once at startup and shared
//! read-only between requests.

use std::collections::HashMap;

use promptgate_core::ValidationError;
use serde::Serialize;

// ─────────────────────────────────────────────
// ProviderClass / ModelDescriptor
// ─────────────────────────────────────────────

/// Which adapter serves a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderClass {
    /// The always-available text provider and universal fallback target.
    Default,
    /// Single external image-text endpoint. Failures are terminal.
    ImageGen,
    /// Shared multi-model gateway, parametrized by model id.
    Pooled,
}

impl ProviderClass {
    /// The class a failed attempt falls back to, if any.
    pub fn fallback(&self) -> Option<ProviderClass> {
        match self {
            ProviderClass::Pooled => Some(ProviderClass::Default),
            ProviderClass::Default | ProviderClass::ImageGen => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderClass::Default => "default",
            ProviderClass::ImageGen => "image_gen",
            ProviderClass::Pooled => "pooled",
        }
    }
}

/// Static description of one model identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Exact, case-sensitive identifier supplied by callers.
    pub id: &'static str,
    /// Human-readable name for listings.
    pub display_name: &'static str,
    pub provider_class: ProviderClass,
}

const fn model(
    id: &'static str,
    display_name: &'static str,
    provider_class: ProviderClass,
) -> ModelDescriptor {
    ModelDescriptor {
        id,
        display_name,
        provider_class,
    }
}

/// Id of the model served by the default provider.
pub const DEFAULT_MODEL_ID: &str = "dtempire";

/// Every supported model, in listing order.
pub static MODELS: &[ModelDescriptor] = &[
    model(DEFAULT_MODEL_ID, "DTempire AI (Default)", ProviderClass::Default),
    // Pooled gateway models
    model("deepseek", "DeepSeek", ProviderClass::Pooled),
    model("llama", "Llama", ProviderClass::Pooled),
    model("nemotron", "Nemotron", ProviderClass::Pooled),
    model("gemma", "Gemma", ProviderClass::Pooled),
    model("qwen", "Qwen", ProviderClass::Pooled),
    model("axentra", "Axentra", ProviderClass::Pooled),
    model("grok", "Grok", ProviderClass::Pooled),
    model("popcat", "PopCat", ProviderClass::Pooled),
    model("claude", "Claude", ProviderClass::Pooled),
    model("gpt5", "GPT-5", ProviderClass::Pooled),
    // Image generation
    model("img_flux", "Image Flux", ProviderClass::ImageGen),
    model("img_turbo", "Image Turbo", ProviderClass::ImageGen),
    model("img_gpt", "Image GPT", ProviderClass::ImageGen),
    model("img_stable", "Image Stable", ProviderClass::ImageGen),
];

// ─────────────────────────────────────────────
// ModelRegistry
// ─────────────────────────────────────────────

/// O(1) index over a model table.
#[derive(Clone, Debug)]
pub struct ModelRegistry {
    models: &'static [ModelDescriptor],
    by_id: HashMap<&'static str, usize>,
}

impl ModelRegistry {
    /// Index an arbitrary static table.
    ///
    /// Ids must be unique; a duplicate is a programming error in the table.
    pub fn new(models: &'static [ModelDescriptor]) -> Self {
        let mut by_id = HashMap::with_capacity(models.len());
        for (idx, descriptor) in models.iter().enumerate() {
            let previous = by_id.insert(descriptor.id, idx);
            debug_assert!(previous.is_none(), "duplicate model id {}", descriptor.id);
        }
        Self { models, by_id }
    }

    /// The built-in [`MODELS`] table.
    pub fn builtin() -> Self {
        Self::new(MODELS)
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, model_id: &str) -> Option<&'static ModelDescriptor> {
        let models = self.models;
        self.by_id.get(model_id).map(|&idx| &models[idx])
    }

    /// Lookup that produces the user-facing validation error on a miss.
    pub fn resolve(&self, model_id: &str) -> Result<&'static ModelDescriptor, ValidationError> {
        self.get(model_id)
            .ok_or_else(|| ValidationError::UnknownModel {
                model: model_id.to_string(),
                available: self.ids().map(String::from).collect(),
            })
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.by_id.contains_key(model_id)
    }

    /// Ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> {
        self.models.iter().map(|m| m.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
