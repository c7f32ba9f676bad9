//! Corpus summary: frequency tables over chunk tags.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;

use figurag_core::types::IngestReport;

const TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorpusReport {
    pub total_chunks: usize,
    pub total_documents: usize,
    pub skipped_files: usize,
    pub top_methods: Vec<(String, usize)>,
    pub top_data_types: Vec<(String, usize)>,
    pub top_biology_areas: Vec<(String, usize)>,
    pub complexity: BTreeMap<String, usize>,
}

impl CorpusReport {
    pub fn from_ingest(report: &IngestReport) -> Self {
        let mut methods = HashMap::new();
        let mut data_types = HashMap::new();
        let mut areas = HashMap::new();
        let mut complexity = BTreeMap::new();
        let mut documents = HashSet::new();
        for chunk in &report.chunks {
            documents.insert(chunk.doc_id.as_str());
            tally(&mut methods, &chunk.tags.methods);
            tally(&mut data_types, &chunk.tags.input_types);
            tally(&mut areas, &chunk.tags.biology_areas);
            if !chunk.tags.complexity.is_empty() {
                *complexity.entry(chunk.tags.complexity.clone()).or_insert(0) += 1;
            }
        }
        Self {
            total_chunks: report.chunks.len(),
            total_documents: documents.len(),
            skipped_files: report.skipped.len(),
            top_methods: top(methods),
            top_data_types: top(data_types),
            top_biology_areas: top(areas),
            complexity,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# FigureYa 语料摘要\n\n");
        let _ = writeln!(out, "- 文档数: {}", self.total_documents);
        let _ = writeln!(out, "- 文本块数: {}", self.total_chunks);
        let _ = writeln!(out, "- 跳过文件: {}", self.skipped_files);
        section(&mut out, "技术方法", &self.top_methods);
        section(&mut out, "数据类型", &self.top_data_types);
        section(&mut out, "生物学领域", &self.top_biology_areas);
        let levels: Vec<(String, usize)> = self.complexity.iter().map(|(k, v)| (k.clone(), *v)).collect();
        section(&mut out, "复杂度分布", &levels);
        out
    }
}

fn tally(counts: &mut HashMap<String, usize>, labels: &[String]) {
    for label in labels {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
}

/// Descending by count, ties by label, first ten.
fn top(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut items: Vec<(String, usize)> = counts.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(TOP_N);
    items
}

fn section(out: &mut String, heading: &str, rows: &[(String, usize)]) {
    let _ = writeln!(out, "\n## {heading}\n");
    if rows.is_empty() {
        out.push_str("- (无)\n");
    }
    for (label, count) in rows {
        let _ = writeln!(out, "- {label}: {count}");
    }
}
