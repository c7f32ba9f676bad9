//! Domain types shared by the scorer, the ingestion pipeline and the engine.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::traits::Scorable;

pub type ItemId = String;

/// One analysis category of the module catalog.
///
/// - `topic`: unique human-readable key (e.g. "生存分析")
/// - `modules`: ordered FigureYa module identifiers
/// - `input_data`/`output_types`: free-text data and artifact labels
/// - `parameters`: parameter name to default value
/// - `keywords`: domain tags, scored as the lowest-weight signal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub topic: String,
    pub modules: Vec<String>,
    pub description: String,
    pub methods: Vec<String>,
    pub input_data: Vec<String>,
    pub output_types: Vec<String>,
    pub parameters: BTreeMap<String, String>,
    pub keywords: Vec<String>,
}

impl Scorable for CatalogEntry {
    fn item_id(&self) -> &str {
        &self.topic
    }

    fn title(&self) -> &str {
        &self.topic
    }

    fn names(&self) -> &[String] {
        &self.modules
    }

    fn body(&self) -> Cow<'_, str> {
        let mut body = String::with_capacity(self.description.len() + 64);
        body.push_str(&self.topic);
        body.push('\n');
        body.push_str(&self.description);
        for field in [&self.modules, &self.methods, &self.keywords] {
            if !field.is_empty() {
                body.push('\n');
                body.push_str(&field.join(" "));
            }
        }
        Cow::Owned(body)
    }

    fn methods(&self) -> &[String] {
        &self.methods
    }

    fn input_types(&self) -> &[String] {
        &self.input_data
    }

    fn output_types(&self) -> &[String] {
        &self.output_types
    }

    fn domain_tags(&self) -> &[String] {
        &self.keywords
    }
}

/// Labels derived from a chunk by keyword-pattern matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkTags {
    pub title: String,
    pub description: String,
    pub input_types: Vec<String>,
    pub output_types: Vec<String>,
    pub methods: Vec<String>,
    pub biology_areas: Vec<String>,
    pub complexity: String,
    pub parameters: Vec<String>,
}

/// A paragraph-aligned slice of one source document.
///
/// `id` is `<doc_id>:<chunk_index>`. `text` never exceeds the configured
/// budget unless a single paragraph alone is larger than it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    pub id: ItemId,
    pub doc_id: String,
    pub source_path: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub text: String,
    #[serde(default)]
    pub tags: ChunkTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    /// Catalog-shaped view of the chunk so the renderer can treat both
    /// knowledge sources alike. Detected parameters carry no default.
    pub fn as_entry(&self) -> CatalogEntry {
        CatalogEntry {
            topic: self.tags.title.clone(),
            modules: vec![self.doc_id.clone()],
            description: self.tags.description.clone(),
            methods: self.tags.methods.clone(),
            input_data: self.tags.input_types.clone(),
            output_types: self.tags.output_types.clone(),
            parameters: self
                .tags
                .parameters
                .iter()
                .map(|p| (p.clone(), String::new()))
                .collect(),
            keywords: self.tags.biology_areas.clone(),
        }
    }
}

impl Scorable for DocumentChunk {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.tags.title
    }

    fn body(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn methods(&self) -> &[String] {
        &self.tags.methods
    }

    fn input_types(&self) -> &[String] {
        &self.tags.input_types
    }

    fn output_types(&self) -> &[String] {
        &self.tags.output_types
    }

    fn domain_tags(&self) -> &[String] {
        &self.tags.biology_areas
    }
}

/// Query intent, checked in declaration order by the classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ModuleRecommendation,
    ParameterHelp,
    DataPreparation,
    ResultInterpretation,
    MethodologyGuidance,
    Troubleshooting,
    GeneralInquiry,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::ModuleRecommendation,
        Intent::ParameterHelp,
        Intent::DataPreparation,
        Intent::ResultInterpretation,
        Intent::MethodologyGuidance,
        Intent::Troubleshooting,
        Intent::GeneralInquiry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::ModuleRecommendation => "module_recommendation",
            Intent::ParameterHelp => "parameter_help",
            Intent::DataPreparation => "data_preparation",
            Intent::ResultInterpretation => "result_interpretation",
            Intent::MethodologyGuidance => "methodology_guidance",
            Intent::Troubleshooting => "troubleshooting",
            Intent::GeneralInquiry => "general_inquiry",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicates which retrieval signal produced a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Keyword,
    Semantic,
    Hybrid,
}

/// The minimal surface returned by the scorers.
///
/// `id` matches `Scorable::item_id`. Higher scores are better.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: ItemId,
    pub score: f32,
    pub source: SourceKind,
}

/// A ranked knowledge item as exposed in query results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchedEntry {
    pub id: ItemId,
    pub score: f32,
    pub source: SourceKind,
    pub entry: CatalogEntry,
}

/// Whether the response text came from the completion capability or the
/// deterministic templates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrigin {
    Llm,
    Template,
}

/// Per-request answer. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query: String,
    pub intent: Intent,
    pub response: String,
    /// Display heuristic in [0, 0.95], not a calibrated probability.
    pub confidence: f32,
    pub matched_entries: Vec<MatchedEntry>,
    pub next_steps: Vec<String>,
    pub origin: ResponseOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedUnit {
    pub path: String,
    pub reason: String,
}

/// Outcome of a corpus ingestion: the chunks plus every unit that was skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub chunks: Vec<DocumentChunk>,
    pub files_processed: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl IngestReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
