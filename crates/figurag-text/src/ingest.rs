//! Turns documents into tagged `DocumentChunk`s.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use figurag_core::data_processor::{ChunkingConfig, DataProcessor};
use figurag_core::error::Result;
use figurag_core::types::{DocumentChunk, IngestReport, SkippedUnit};

use crate::tags::TagExtractor;

#[derive(Default)]
pub struct Ingestor {
    processor: DataProcessor,
    tagger: TagExtractor,
}

impl Ingestor {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { processor: DataProcessor::with_config(config), tagger: TagExtractor::new() }
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self::new(ChunkingConfig { max_chars, ..ChunkingConfig::default() })
    }

    pub fn processor(&self) -> &DataProcessor { &self.processor }

    /// Chunks and tags one document. Chunk titles fall back to the document
    /// title, then to the file stem.
    pub fn ingest(&self, source_text: &str, source_path: &Path) -> Vec<DocumentChunk> {
        let doc_id = self.processor.extract_doc_id(source_path);
        self.ingest_as(source_text, source_path, &doc_id)
    }

    fn ingest_as(&self, source_text: &str, source_path: &Path, doc_id: &str) -> Vec<DocumentChunk> {
        let doc_title = self.tagger.title(source_text).unwrap_or_else(|| doc_id.to_string());
        let pieces = self.processor.chunk_text(source_text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| {
                let mut tags = self.tagger.extract(&text);
                if tags.title.is_empty() {
                    tags.title = doc_title.clone();
                }
                DocumentChunk {
                    id: format!("{doc_id}:{chunk_index}"),
                    doc_id: doc_id.to_string(),
                    source_path: source_path.to_string_lossy().to_string(),
                    chunk_index,
                    total_chunks,
                    text,
                    tags,
                    embedding: None,
                }
            })
            .collect()
    }

    pub fn ingest_directory(&self, root: &Path, limit: Option<usize>) -> Result<IngestReport> {
        let files = self.processor.list_source_files(root, limit)?;
        if files.is_empty() {
            warn!(dir = %root.display(), "No source files found");
        }
        Ok(self.ingest_files(&files, |_| {}))
    }

    /// Ingests the given files in order. Unreadable, non-UTF-8 and near-empty
    /// files are recorded in `skipped`; the rest still get processed.
    pub fn ingest_files(&self, files: &[PathBuf], mut on_file: impl FnMut(&Path)) -> IngestReport {
        let mut report = IngestReport::default();
        let mut doc_ids: HashMap<String, usize> = HashMap::new();
        for path in files {
            on_file(path);
            let content = match self.processor.read_source(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                    report.skipped.push(SkippedUnit { path: path.display().to_string(), reason: e.to_string() });
                    continue;
                }
            };
            if self.processor.is_too_short(&content) {
                debug!(path = %path.display(), "Skipping near-empty file");
                report.skipped.push(SkippedUnit {
                    path: path.display().to_string(),
                    reason: "content too short".to_string(),
                });
                continue;
            }
            let stem = self.processor.extract_doc_id(path);
            let seen = doc_ids.entry(stem.clone()).or_insert(0);
            *seen += 1;
            let doc_id = if *seen == 1 { stem } else { format!("{stem}-{seen}") };
            report.chunks.extend(self.ingest_as(&content, path, &doc_id));
            report.files_processed += 1;
        }
        info!(
            files = report.files_processed,
            chunks = report.chunks.len(),
            skipped = report.skipped.len(),
            "Ingestion finished"
        );
        report
    }
}
