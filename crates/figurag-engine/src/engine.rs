use serde::Serialize;
use tracing::{debug, info, warn};

use figurag_core::config::RetrievalSettings;
use figurag_core::traits::{Completer, Embedder};
use figurag_core::types::{Intent, MatchedEntry, QueryResult, ResponseOrigin, SourceKind};
use figurag_provider::cosine_similarity;
use figurag_text::{IntentClassifier, Relevance, RelevanceScorer};

use crate::confidence::{confidence, next_steps};
use crate::knowledge::Knowledge;
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::render::render;

pub const EMPTY_QUERY_RESPONSE: &str = "请输入您的问题。";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub knowledge_size: usize,
    pub source: &'static str,
    pub embeddings: Option<String>,
    pub llm: Option<String>,
    pub features: Vec<&'static str>,
}

/// Query pipeline: classify, rank, then answer from the completer or the
/// templates. Holds no request-scoped state, so `&self` calls are reentrant.
pub struct RagEngine {
    knowledge: Knowledge,
    classifier: IntentClassifier,
    scorer: RelevanceScorer,
    retrieval: RetrievalSettings,
    completer: Option<Box<dyn Completer>>,
    embedder: Option<Box<dyn Embedder>>,
    item_vectors: Vec<Option<Vec<f32>>>,
}

impl RagEngine {
    pub fn new(knowledge: Knowledge) -> Self {
        let n = knowledge.len();
        Self {
            knowledge,
            classifier: IntentClassifier::new(),
            scorer: RelevanceScorer::default(),
            retrieval: RetrievalSettings::default(),
            completer: None,
            embedder: None,
            item_vectors: vec![None; n],
        }
    }

    pub fn with_settings(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_completer(mut self, completer: Box<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Embeds every knowledge item once. If that fails the embedder is
    /// dropped and retrieval stays keyword-only.
    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        let texts = self.knowledge.texts();
        match embedder.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == texts.len() => {
                if let Knowledge::Corpus(chunks) = &mut self.knowledge {
                    for (chunk, v) in chunks.iter_mut().zip(&vectors) {
                        chunk.embedding = Some(v.clone());
                    }
                }
                self.item_vectors = vectors.into_iter().map(Some).collect();
                info!(embedder = embedder.id(), items = texts.len(), "Knowledge embedded");
                self.embedder = Some(embedder);
            }
            Ok(vectors) => warn!(
                expected = texts.len(),
                got = vectors.len(),
                "Embedding count mismatch; using keyword scoring only"
            ),
            Err(e) => warn!(error = %e, "Embedding knowledge failed; using keyword scoring only"),
        }
        self
    }

    pub fn knowledge(&self) -> &Knowledge { &self.knowledge }

    pub fn classify(&self, query: &str) -> Intent {
        self.classifier.classify(query)
    }

    /// Ranked matches only, no rendering. `top_k == 0` means the configured default.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<MatchedEntry> {
        let top_k = if top_k == 0 { self.retrieval.top_k } else { top_k };
        let keyword = match &self.knowledge {
            Knowledge::Catalog(c) => self.scorer.score_all(query, c.entries()),
            Knowledge::Corpus(chunks) => self.scorer.score_all(query, chunks),
        };
        let semantic = self.semantic_scores(query);

        let mut ranked: Vec<(usize, Relevance, SourceKind)> = keyword
            .iter()
            .enumerate()
            .filter_map(|(i, kw)| {
                let sem = semantic.as_ref().and_then(|s| s.get(i).copied()).unwrap_or(0.0);
                let source = match (kw.score > 0.0, sem > 0.0) {
                    (true, true) => SourceKind::Hybrid,
                    (true, false) => SourceKind::Keyword,
                    (false, true) => SourceKind::Semantic,
                    (false, false) => return None,
                };
                Some((i, Relevance { exact: kw.exact, score: kw.score + sem }, source))
            })
            .collect();
        // A topic named in the query leads even when semantic weight favours another.
        ranked.sort_by(|a, b| a.1.rank_cmp(&b.1));
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .filter_map(|(i, relevance, source)| {
                let entry = self.knowledge.entry_view(i)?;
                let id = self.knowledge.item(i)?.item_id().to_string();
                Some(MatchedEntry { id, score: relevance.score, source, entry })
            })
            .collect()
    }

    /// Weighted cosine per item, zero below the threshold. `None` when no
    /// embedder is configured or the query could not be embedded.
    fn semantic_scores(&self, query: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        let q = match embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Query embedding failed; keyword scores only");
                return None;
            }
        };
        let threshold = self.retrieval.similarity_threshold;
        let weight = self.retrieval.semantic_weight;
        Some(
            self.item_vectors
                .iter()
                .map(|v| {
                    let sim = v.as_ref().map_or(0.0, |v| cosine_similarity(&q, v));
                    if sim >= threshold && sim > 0.0 { weight * sim } else { 0.0 }
                })
                .collect(),
        )
    }

    /// Never fails: empty queries and provider errors both yield a result.
    pub fn search(&self, query: &str, top_k: usize) -> QueryResult {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return empty_query_result(query);
        }
        let intent = self.classify(trimmed);
        let matched = self.retrieve(trimmed, top_k);
        debug!(%intent, matches = matched.len(), "Query classified");

        let (response, origin) = match self.ask_completer(trimmed, &matched) {
            Some(text) => (text, ResponseOrigin::Llm),
            None => (render(trimmed, intent, &matched), ResponseOrigin::Template),
        };
        QueryResult {
            query: query.to_string(),
            intent,
            response,
            confidence: confidence(intent, &matched),
            next_steps: next_steps(intent, &matched),
            matched_entries: matched,
            origin,
        }
    }

    pub fn ask(&self, query: &str) -> QueryResult {
        self.search(query, self.retrieval.top_k)
    }

    fn ask_completer(&self, query: &str, matched: &[MatchedEntry]) -> Option<String> {
        let completer = self.completer.as_ref()?;
        if matched.is_empty() {
            return None;
        }
        match completer.complete(SYSTEM_PROMPT, &user_prompt(query, matched)) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!(model = completer.model(), "Empty completion; using template answer");
                None
            }
            Err(e) => {
                warn!(model = completer.model(), error = %e, "Completion failed; using template answer");
                None
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        let mut features = vec!["intent_classification", "keyword_scoring", "template_rendering"];
        if self.embedder.is_some() {
            features.push("semantic_blending");
        }
        if self.completer.is_some() {
            features.push("llm_answers");
        }
        if matches!(self.knowledge, Knowledge::Corpus(_)) {
            features.push("document_ingestion");
        }
        EngineStatus {
            knowledge_size: self.knowledge.len(),
            source: self.knowledge.source_label(),
            embeddings: self.embedder.as_ref().map(|e| e.id().to_string()),
            llm: self.completer.as_ref().map(|c| c.model().to_string()),
            features,
        }
    }
}

pub fn empty_query_result(query: &str) -> QueryResult {
    QueryResult {
        query: query.to_string(),
        intent: Intent::GeneralInquiry,
        response: EMPTY_QUERY_RESPONSE.to_string(),
        confidence: 0.0,
        matched_entries: Vec::new(),
        next_steps: Vec::new(),
        origin: ResponseOrigin::Template,
    }
}
