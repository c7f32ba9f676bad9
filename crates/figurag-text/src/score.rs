//! Weighted keyword-overlap relevance.
//!
//! Signals, strongest first: the whole query inside the item body (or the
//! whole title inside the query), title/name overlap, declared methods,
//! input types, output types, domain tags. Signals are summed, so one query
//! term may count in several categories. Ranking orders by exact match kind
//! before score, so an item whose title appears in the query always leads.

use std::cmp::Ordering;
use std::collections::HashSet;

use figurag_core::traits::Scorable;
use figurag_core::types::{SearchHit, SourceKind};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on",
    "that", "the", "to", "was", "will", "with", "or", "but", "not", "this", "these", "they", "them", "their", "there",
    "then", "than", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could",
    "should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

/// Minimum length, in chars, of the contained side of a term/keyword match.
const MIN_MATCH_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub exact: f32,
    pub title: f32,
    pub method: f32,
    pub input: f32,
    pub output: f32,
    pub domain: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { exact: 10.0, title: 4.0, method: 3.0, input: 2.5, output: 2.0, domain: 1.5 }
    }
}

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoreWeights,
    stop_words: HashSet<&'static str>,
}

impl Default for RelevanceScorer {
    fn default() -> Self { Self::new(ScoreWeights::default()) }
}

/// A query prepared once and scored against many items.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    normalized: String,
    terms: Vec<String>,
}

impl PreparedQuery {
    pub fn terms(&self) -> &[String] { &self.terms }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() && self.normalized.is_empty() }
}

impl RelevanceScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights, stop_words: STOP_WORDS.iter().copied().collect() }
    }

    pub fn weights(&self) -> &ScoreWeights { &self.weights }

    /// Lower-cases, splits on whitespace, trims punctuation from each term
    /// and drops stop words.
    pub fn prepare(&self, query: &str) -> PreparedQuery {
        let normalized = trim_punctuation(&query.trim().to_lowercase()).to_string();
        let terms = normalized
            .split_whitespace()
            .map(trim_punctuation)
            .filter(|t| !t.is_empty() && !self.stop_words.contains(t))
            .map(str::to_string)
            .collect();
        PreparedQuery { normalized, terms }
    }

    pub fn score(&self, query: &str, item: &dyn Scorable) -> f32 {
        self.score_prepared(&self.prepare(query), item).score
    }

    pub fn score_prepared(&self, query: &PreparedQuery, item: &dyn Scorable) -> Relevance {
        if query.is_empty() {
            return Relevance::default();
        }
        let w = &self.weights;
        let mut score = 0.0;

        let title = item.title().trim().to_lowercase();
        let body = item.body().to_lowercase();
        let exact = if title.chars().count() >= MIN_MATCH_CHARS && query.normalized.contains(&title) {
            ExactMatch::TitleInQuery
        } else if query.normalized.chars().count() >= MIN_MATCH_CHARS && body.contains(&query.normalized) {
            ExactMatch::QueryInBody
        } else {
            ExactMatch::None
        };
        if exact != ExactMatch::None {
            score += w.exact;
        }

        let title_hits = usize::from(self.overlaps(&query.terms, &title))
            + item.names().iter().filter(|n| self.overlaps(&query.terms, n)).count();
        score += w.title * title_hits as f32;
        score += w.method * self.count_overlaps(&query.terms, item.methods());
        score += w.input * self.count_overlaps(&query.terms, item.input_types());
        score += w.output * self.count_overlaps(&query.terms, item.output_types());
        score += w.domain * self.count_overlaps(&query.terms, item.domain_tags());
        Relevance { exact, score }
    }

    /// Scores every item; the result is index-aligned with `items`.
    pub fn score_all<T: Scorable>(&self, query: &str, items: &[T]) -> Vec<Relevance> {
        let prepared = self.prepare(query);
        items.iter().map(|item| self.score_prepared(&prepared, item)).collect()
    }

    /// Full scan, positive scores only, best first, truncated to `top_k`.
    pub fn rank<T: Scorable>(&self, query: &str, items: &[T], top_k: usize) -> Vec<SearchHit> {
        let mut scored: Vec<(&T, Relevance)> = items
            .iter()
            .zip(self.score_all(query, items))
            .filter(|(_, r)| r.score > 0.0)
            .collect();
        scored.sort_by(|a, b| a.1.rank_cmp(&b.1));
        scored
            .into_iter()
            .take(top_k)
            .map(|(item, r)| SearchHit { id: item.item_id().to_string(), score: r.score, source: SourceKind::Keyword })
            .collect()
    }

    fn count_overlaps(&self, terms: &[String], keywords: &[String]) -> f32 {
        keywords.iter().filter(|k| self.overlaps(terms, k)).count() as f32
    }

    fn overlaps(&self, terms: &[String], keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        let keyword_long = keyword.chars().count() >= MIN_MATCH_CHARS;
        terms.iter().any(|term| {
            (term.chars().count() >= MIN_MATCH_CHARS && keyword.contains(term.as_str()))
                || (keyword_long && term.contains(keyword.as_str()))
        })
    }
}

/// How the whole query relates to an item. Declared weakest first, so the
/// derived order ranks a topic named in the query above everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExactMatch {
    #[default]
    None,
    QueryInBody,
    TitleInQuery,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Relevance {
    pub exact: ExactMatch,
    pub score: f32,
}

impl Relevance {
    /// Best first: a stronger exact match wins regardless of score, then
    /// higher score. NaN compares equal.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .exact
            .cmp(&self.exact)
            .then_with(|| other.score.partial_cmp(&self.score).unwrap_or(Ordering::Equal))
    }
}

fn trim_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_punctuation() || "？。，！：；、“”‘’（）《》".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figurag_core::types::CatalogEntry;

    fn entry(topic: &str, methods: &[&str]) -> CatalogEntry {
        CatalogEntry {
            topic: topic.into(),
            methods: methods.iter().map(|s| s.to_string()).collect(),
            ..CatalogEntry::default()
        }
    }

    #[test]
    fn prepare_drops_stop_words_and_punctuation() {
        let q = RelevanceScorer::default().prepare("What is the PCA?");
        assert_eq!(q.terms(), ["pca"]);
    }

    #[test]
    fn empty_and_malformed_items_score_zero() {
        let scorer = RelevanceScorer::default();
        assert_eq!(scorer.score("生存", &CatalogEntry::default()), 0.0);
        assert_eq!(scorer.score("", &entry("生存分析", &[])), 0.0);
    }

    #[test]
    fn method_hit_outweighs_nothing() {
        let scorer = RelevanceScorer::default();
        let s = scorer.score("limma", &entry("差异表达分析", &["limma", "edgeR"]));
        // exact (query in body) + one method
        assert_eq!(s, 13.0);
    }

    #[test]
    fn named_title_outranks_higher_scoring_item() {
        let scorer = RelevanceScorer::default();
        let named = entry("生存分析", &[]);
        let busy = entry("差异表达分析", &["DESeq2", "edgeR", "limma", "火山图", "热图"]);
        let query = scorer.prepare("生存分析 DESeq2 edgeR limma 火山图 热图");
        let a = scorer.score_prepared(&query, &named);
        let b = scorer.score_prepared(&query, &busy);
        assert_eq!(a.exact, ExactMatch::TitleInQuery);
        assert!(b.score > a.score);
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
    }

    #[test]
    fn single_character_terms_do_not_match() {
        let scorer = RelevanceScorer::default();
        assert_eq!(scorer.score("x", &entry("聚类", &["k-means"])), 0.0);
    }
}
