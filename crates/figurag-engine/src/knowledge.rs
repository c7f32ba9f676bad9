//! The knowledge source the engine ranks: a topic catalog or an ingested corpus.

use std::path::Path;
use tracing::{info, warn};

use figurag_core::catalog::Catalog;
use figurag_core::config::{resolve_with_base, KnowledgeSettings};
use figurag_core::traits::Scorable;
use figurag_core::types::{CatalogEntry, DocumentChunk};
use figurag_text::Ingestor;

#[derive(Debug, Clone)]
pub enum Knowledge {
    Catalog(Catalog),
    Corpus(Vec<DocumentChunk>),
}

impl Knowledge {
    /// Corpus directory first, then a JSON catalog, then the builtin table.
    /// A source that cannot be loaded is logged and the next one is tried.
    /// Returns the knowledge plus the number of skipped units.
    pub fn from_settings(settings: &KnowledgeSettings, chunk_max_chars: usize, base: &Path) -> (Self, usize) {
        // Files a corpus pass rejected still count when a fallback source wins.
        let mut skipped = 0;
        if let Some(dir) = settings.corpus_dir.as_deref() {
            let dir = resolve_with_base(base, dir);
            match Ingestor::with_max_chars(chunk_max_chars).ingest_directory(&dir, Some(settings.max_files)) {
                Ok(report) => {
                    for unit in &report.skipped {
                        warn!(path = %unit.path, reason = %unit.reason, "Skipped corpus file");
                    }
                    if !report.chunks.is_empty() {
                        info!(dir = %dir.display(), chunks = report.chunks.len(), "Loaded corpus");
                        return (Knowledge::Corpus(report.chunks), report.skipped.len());
                    }
                    warn!(dir = %dir.display(), skipped = report.skipped.len(), "Corpus produced no chunks; falling back");
                    skipped += report.skipped.len();
                }
                Err(e) => warn!(dir = %dir.display(), error = %e, "Corpus unavailable; falling back"),
            }
        }
        if let Some(path) = settings.catalog_path.as_deref() {
            let path = resolve_with_base(base, path);
            match Catalog::load(&path) {
                Ok(load) if !load.catalog.is_empty() => {
                    info!(path = %path.display(), entries = load.catalog.len(), skipped = load.skipped, "Loaded catalog");
                    return (Knowledge::Catalog(load.catalog), skipped + load.skipped);
                }
                Ok(load) => {
                    warn!(path = %path.display(), skipped = load.skipped, "Catalog has no usable entries; using builtin");
                    skipped += load.skipped;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Catalog unavailable; using builtin"),
            }
        }
        (Knowledge::Catalog(Catalog::builtin()), skipped)
    }

    pub fn len(&self) -> usize {
        match self {
            Knowledge::Catalog(c) => c.len(),
            Knowledge::Corpus(chunks) => chunks.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn source_label(&self) -> &'static str {
        match self {
            Knowledge::Catalog(_) => "catalog",
            Knowledge::Corpus(_) => "corpus",
        }
    }

    pub fn item(&self, index: usize) -> Option<&dyn Scorable> {
        match self {
            Knowledge::Catalog(c) => c.entries().get(index).map(|e| e as &dyn Scorable),
            Knowledge::Corpus(chunks) => chunks.get(index).map(|c| c as &dyn Scorable),
        }
    }

    /// Catalog-shaped view used by the renderer.
    pub fn entry_view(&self, index: usize) -> Option<CatalogEntry> {
        match self {
            Knowledge::Catalog(c) => c.entries().get(index).cloned(),
            Knowledge::Corpus(chunks) => chunks.get(index).map(DocumentChunk::as_entry),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.item(i)).map(|item| item.body().into_owned()).collect()
    }
}
