//! Remote and local capability providers behind the `Completer` and
//! `Embedder` traits.
//!
//! Respects `APP_USE_FAKE_EMBEDDINGS=1` to switch to the deterministic
//! `HashEmbedder` for tests and offline development.

pub mod cache;
pub mod fake;
pub mod openai;
pub mod similarity;

use tracing::{info, warn};

use figurag_core::config::{ProviderKind, ProviderSettings};
use figurag_core::traits::{Completer, Embedder};

pub use cache::CachedEmbedder;
pub use fake::HashEmbedder;
pub use openai::OpenAiCompatClient;
pub use similarity::cosine_similarity;

pub const FAKE_EMBEDDING_DIM: usize = 256;

/// Values shipped in sample `.env` files that must not be sent upstream.
const PLACEHOLDER_KEYS: &[&str] = &["your-openai-api-key-here", "your-zhipuai-api-key-here", "demo-key-for-testing"];

/// Whatever capabilities could be built; either may be absent.
#[derive(Default)]
pub struct Providers {
    pub completer: Option<Box<dyn Completer>>,
    pub embedder: Option<Box<dyn Embedder>>,
}

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDER_KEYS.contains(&key)
}

/// Name of the environment variable holding the key for `settings.kind`.
pub fn api_key_env(settings: &ProviderSettings) -> Option<String> {
    settings
        .api_key_env
        .clone()
        .or_else(|| openai::defaults_for(settings.kind).map(|d| d.3.to_string()))
}

/// Builds the configured providers, degrading to none when the key is
/// missing or a placeholder. Never fails.
pub fn build_providers(settings: &ProviderSettings) -> Providers {
    let key = api_key_env(settings).and_then(|var| std::env::var(var).ok());
    build_providers_with_key(settings, key)
}

pub fn build_providers_with_key(settings: &ProviderSettings, api_key: Option<String>) -> Providers {
    let mut providers = Providers::default();
    match settings.kind {
        ProviderKind::None => {}
        ProviderKind::Fake => {
            providers.embedder = Some(cached(Box::new(HashEmbedder::new(FAKE_EMBEDDING_DIM))));
        }
        ProviderKind::OpenAi | ProviderKind::ZhipuAi => match api_key.filter(|k| is_usable_key(k)) {
            None => warn!(kind = ?settings.kind, "API key missing or placeholder; answering from templates only"),
            Some(key) => match OpenAiCompatClient::new(settings, key.trim().to_string()) {
                Ok(client) => {
                    info!(kind = ?settings.kind, model = client.model(), base_url = client.base_url(), "Remote provider ready");
                    if settings.use_embeddings {
                        providers.embedder = Some(cached(Box::new(client.clone())));
                    }
                    providers.completer = Some(Box::new(client));
                }
                Err(e) => warn!(error = %e, "Could not build provider client"),
            },
        },
    }
    if use_fake_embeddings() && providers.embedder.is_none() {
        info!("Using HashEmbedder (APP_USE_FAKE_EMBEDDINGS)");
        providers.embedder = Some(cached(Box::new(HashEmbedder::new(FAKE_EMBEDDING_DIM))));
    }
    providers
}

fn cached(inner: Box<dyn Embedder>) -> Box<dyn Embedder> {
    Box::new(CachedEmbedder::new(inner))
}
