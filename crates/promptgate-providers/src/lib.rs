//! Provider dispatch and response normalization for PromptGate.
//!
//! # Architecture
//!
//! - [`registry`]: static model table + O(1) [`ModelRegistry`] lookup
//! - [`traits::ProviderAdapter`]: trait every upstream class implements
//! - [`adapters`]: default, pooled and image adapters, selected by class
//! - [`http_provider`]: shared reqwest transport and settings resolution
//! - [`normalize`]: any reply body → one plain-text answer
//! - [`dispatch::Dispatcher`]: primary attempt + default-provider fallback

pub mod adapters;
pub mod dispatch;
pub mod http_provider;
pub mod normalize;
pub mod registry;
pub mod traits;

pub use adapters::{AdapterSet, DefaultAdapter, ImageGenAdapter, PooledAdapter};
pub use dispatch::{AttemptFailure, DispatchError, Dispatcher};
pub use http_provider::AdapterError;
pub use normalize::{normalize, NO_RESPONSE};
pub use registry::{ModelDescriptor, ModelRegistry, ProviderClass, DEFAULT_MODEL_ID, MODELS};
pub use traits::{ProviderAdapter, ProviderOutcome, ProviderRequest};
