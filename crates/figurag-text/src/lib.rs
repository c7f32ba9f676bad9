//! Keyword-driven text processing: intent classification, weighted
//! relevance scoring, dictionary tag extraction and document ingestion.
//!
//! Nothing in this crate touches the network; every function is
//! deterministic for a given input.

pub mod classify;
pub mod ingest;
pub mod report;
pub mod score;
pub mod tags;

pub use classify::IntentClassifier;
pub use ingest::Ingestor;
pub use report::CorpusReport;
pub use score::{ExactMatch, Relevance, RelevanceScorer, ScoreWeights};
pub use tags::TagExtractor;

/// Case-insensitive keyword test used by the taggers.
///
/// Keywords containing ASCII letters or digits must not be glued to other
/// ASCII alphanumerics, so `os` does not fire inside `cost`. Other keywords
/// (CJK) match as plain substrings. `haystack` must already be lower-cased.
pub(crate) fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    if !needle.chars().any(|c| c.is_ascii_alphanumeric()) {
        return haystack.contains(&needle);
    }
    let glued = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    haystack.match_indices(&needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !glued(before) && !glued(after)
    })
}
