//! Retrieval-and-response engine over the FigureYa module catalog.
//!
//! `RagEngine::search` maps a query to a `QueryResult`: intent, ranked
//! matches, answer text, display confidence and suggested next steps.
//! Remote capabilities are optional; without them answers come from the
//! deterministic templates in [`render`].

pub mod confidence;
pub mod engine;
pub mod knowledge;
pub mod prompt;
pub mod render;

pub use engine::{EngineStatus, RagEngine};
pub use knowledge::Knowledge;

use std::path::Path;

use figurag_core::config::Settings;
use figurag_provider::build_providers;

/// Loads knowledge and providers as configured. Nothing here fails: missing
/// sources fall back to the builtin catalog and missing keys to templates.
pub fn build_engine(settings: &Settings, base: &Path) -> RagEngine {
    let (knowledge, skipped) =
        Knowledge::from_settings(&settings.knowledge, settings.retrieval.chunk_max_chars, base);
    if skipped > 0 {
        tracing::warn!(skipped, "Some knowledge units were skipped");
    }
    let providers = build_providers(&settings.provider);
    let mut engine = RagEngine::new(knowledge).with_settings(settings.retrieval.clone());
    if let Some(completer) = providers.completer {
        engine = engine.with_completer(completer);
    }
    if let Some(embedder) = providers.embedder {
        engine = engine.with_embedder(embedder);
    }
    engine
}
