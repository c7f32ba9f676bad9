//! Paragraph-aligned chunking and source file discovery.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Character budget per chunk, counted in `char`s.
    pub max_chars: usize,
    /// Files whose trimmed content is shorter than this are not worth indexing.
    pub min_document_chars: usize,
    pub extensions: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 500,
            min_document_chars: 50,
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    pub fn config(&self) -> &ChunkingConfig { &self.chunking_config }

    /// Greedily packs blank-line separated paragraphs into chunks of at most
    /// `max_chars`. A paragraph is never split, so one that alone exceeds the
    /// budget becomes a single oversized chunk.
    pub fn chunk_text(&self, content: &str) -> Vec<String> {
        let budget = self.chunking_config.max_chars;
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        for paragraph in paragraphs(content) {
            let para_len = paragraph.chars().count();
            if current_len > 0 && current_len + 2 + para_len > budget {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push_str("\n\n");
                current_len += 2;
            }
            current.push_str(&paragraph);
            current_len += para_len;
        }
        if current_len > 0 {
            chunks.push(current);
        }
        chunks
    }

    /// Reads a source file, rejecting content that is not UTF-8.
    pub fn read_source(&self, file_path: &Path) -> Result<String> {
        let bytes = fs::read(file_path).map_err(|e| Error::Ingest {
            path: file_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|_| Error::Ingest {
            path: file_path.to_path_buf(),
            reason: "not valid UTF-8".to_string(),
        })
    }

    pub fn is_too_short(&self, content: &str) -> bool {
        content.chars().filter(|c| !c.is_whitespace()).count() < self.chunking_config.min_document_chars
    }

    pub fn extract_doc_id(&self, file_path: &Path) -> String {
        file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string_lossy().to_string())
    }

    /// Sorted list of files under `root` with a configured extension,
    /// truncated to `limit` when given.
    pub fn list_source_files(&self, root: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(root.display().to_string()));
        }
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| self.chunking_config.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
            if matches { files.push(path.to_path_buf()); }
        }
        files.sort();
        if let Some(limit) = limit {
            if files.len() > limit {
                debug!(found = files.len(), limit, "Limiting source files");
                files.truncate(limit);
            }
        }
        Ok(files)
    }
}

/// Splits on blank lines; each paragraph keeps its inner line breaks but
/// loses trailing whitespace per line.
fn paragraphs(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                out.push(lines.join("\n"));
                lines.clear();
            }
        } else {
            lines.push(line.trim_end());
        }
    }
    if !lines.is_empty() {
        out.push(lines.join("\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(max_chars: usize) -> DataProcessor {
        DataProcessor::with_config(ChunkingConfig { max_chars, ..ChunkingConfig::default() })
    }

    #[test]
    fn packs_small_paragraphs_together() {
        let chunks = processor(20).chunk_text("aaaa\n\nbbbb\n\ncccc\n\ndddddddddddddddd");
        assert_eq!(chunks, vec!["aaaa\n\nbbbb\n\ncccc", "dddddddddddddddd"]);
    }

    #[test]
    fn oversized_paragraph_stays_whole() {
        let long = "x".repeat(50);
        let chunks = processor(10).chunk_text(&format!("ab\n\n{long}\n\ncd"));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], long);
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(processor(10).chunk_text(" \n\n\t\n").is_empty());
    }
}
