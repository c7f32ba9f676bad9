//! The topic catalog: an immutable list of `CatalogEntry` values built once
//! at startup and handed to the engine.
//!
//! Two sources are supported: the builtin table and a JSON document, either
//! an array of entry objects or an object keyed by topic. Entries that do
//! not parse are skipped and counted, never fatal.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::CatalogEntry;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

/// A loaded catalog plus how many entries were rejected on the way.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub skipped: usize,
}

impl Catalog {
    /// Builds a catalog, keeping the first entry for any repeated topic.
    pub fn new(entries: Vec<CatalogEntry>) -> CatalogLoad {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in entries {
            let topic = entry.topic.trim();
            if topic.is_empty() {
                warn!("Skipping catalog entry without a topic");
                skipped += 1;
                continue;
            }
            if !seen.insert(topic.to_string()) {
                warn!(topic, "Skipping duplicate catalog topic");
                skipped += 1;
                continue;
            }
            kept.push(entry);
        }
        CatalogLoad { catalog: Self { entries: kept }, skipped }
    }

    /// The four analysis categories shipped with the tool.
    pub fn builtin() -> Self {
        let entries = vec![
            entry(
                "差异表达分析",
                &["FigureYa59volcanoV2", "FigureYa9heatmap"],
                "用于识别不同条件或处理组之间基因表达模式的差异",
                &["DESeq2", "edgeR", "limma"],
                &["表达矩阵", "样本分组信息"],
                &["火山图", "热图", "差异基因列表"],
                &[("pvalue", "0.05"), ("logFC", "1"), ("FDR", "0.05")],
                &["RNA-seq", "差异基因", "火山图", "热图"],
            ),
            entry(
                "生存分析",
                &["FigureYa36nSurvV3", "FigureYa1survivalCurve_update"],
                "分析患者生存时间和影响因素的关系",
                &["Kaplan-Meier", "Cox回归"],
                &["生存时间", "生存状态", "协变量"],
                &["生存曲线", "HR值", "置信区间"],
                &[("conf_int", "0.95"), ("method", "Kaplan-Meier")],
                &["生存", "预后", "风险比", "Kaplan-Meier"],
            ),
            entry(
                "单细胞分析",
                &["FigureYa274MuSiCbulkProop", "FigureYa243scMarkerGroupHeatmap"],
                "单个细胞水平的基因表达分析",
                &["质控", "降维", "聚类", "差异分析"],
                &["基因表达矩阵", "细胞元数据"],
                &["UMAP/tSNE图", "细胞聚类图", "标记基因热图"],
                &[("nPCs", "30"), ("resolution", "0.5")],
                &["单细胞", "scRNA-seq", "UMAP", "tSNE", "聚类"],
            ),
            entry(
                "PCA分析",
                &["FigureYa38PCA", "FigureYa164PCA3D"],
                "高维数据的降维和可视化",
                &["主成分分析", "奇异值分解"],
                &["标准化表达矩阵"],
                &["PCA图", "解释方差比例"],
                &[("scale", "TRUE"), ("center", "TRUE")],
                &["PCA", "主成分", "降维", "可视化"],
            ),
        ];
        Self { entries }
    }

    /// Parses a JSON catalog. Only a top-level syntax error is fatal.
    pub fn from_json_str(json: &str) -> Result<CatalogLoad> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| Error::MalformedCatalog(e.to_string()))?;
        let mut entries = Vec::new();
        let mut skipped = 0;
        match root {
            Value::Array(items) => {
                for (idx, item) in items.into_iter().enumerate() {
                    match parse_entry(item, None) {
                        Some(e) => entries.push(e),
                        None => {
                            warn!(index = idx, "Skipping malformed catalog entry");
                            skipped += 1;
                        }
                    }
                }
            }
            Value::Object(map) => {
                for (topic, item) in map {
                    match parse_entry(item, Some(&topic)) {
                        Some(e) => entries.push(e),
                        None => {
                            warn!(topic = %topic, "Skipping malformed catalog entry");
                            skipped += 1;
                        }
                    }
                }
            }
            other => {
                return Err(Error::MalformedCatalog(format!(
                    "expected an array or object, found {}",
                    json_kind(&other)
                )))
            }
        }
        let mut load = Self::new(entries);
        load.skipped += skipped;
        debug!(entries = load.catalog.len(), skipped = load.skipped, "Catalog parsed");
        Ok(load)
    }

    pub fn load(path: &Path) -> Result<CatalogLoad> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, topic: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.topic == topic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    topic: &str,
    modules: &[&str],
    description: &str,
    methods: &[&str],
    input_data: &[&str],
    output_types: &[&str],
    parameters: &[(&str, &str)],
    keywords: &[&str],
) -> CatalogEntry {
    let owned = |xs: &[&str]| xs.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    CatalogEntry {
        topic: topic.to_string(),
        modules: owned(modules),
        description: description.to_string(),
        methods: owned(methods),
        input_data: owned(input_data),
        output_types: owned(output_types),
        parameters: parameters
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        keywords: owned(keywords),
    }
}

/// A list field that may also arrive as one comma-separated string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum TextList {
    #[default]
    Missing,
    One(String),
    Many(Vec<Value>),
}

impl TextList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TextList::Missing => Vec::new(),
            TextList::One(s) => s
                .split(|c: char| c == ',' || c == '，' || c == '、')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            TextList::Many(items) => items.iter().filter_map(scalar_to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    modules: TextList,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    methods: TextList,
    #[serde(default, alias = "inputData", alias = "input")]
    input_data: TextList,
    #[serde(default, alias = "outputTypes", alias = "output")]
    output_types: TextList,
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
    #[serde(default)]
    keywords: TextList,
}

fn parse_entry(item: Value, key: Option<&str>) -> Option<CatalogEntry> {
    if !item.is_object() {
        return None;
    }
    let raw: RawEntry = serde_json::from_value(item).ok()?;
    let topic = raw
        .topic
        .filter(|t| !t.trim().is_empty())
        .or_else(|| key.map(str::to_string))?;
    Some(CatalogEntry {
        topic: topic.trim().to_string(),
        modules: raw.modules.into_vec(),
        description: raw.description.unwrap_or_default(),
        methods: raw.methods.into_vec(),
        input_data: raw.input_data.into_vec(),
        output_types: raw.output_types.into_vec(),
        parameters: raw
            .parameters
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
            .collect(),
        keywords: raw.keywords.into_vec(),
    })
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_unique_topics() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 4);
        let reloaded = Catalog::new(catalog.entries().to_vec());
        assert_eq!(reloaded.skipped, 0);
        assert_eq!(
            catalog.get("生存分析").map(|e| e.parameters.len()),
            Some(2)
        );
    }

    #[test]
    fn comma_separated_fields_are_split() {
        let list = TextList::One("表达矩阵，样本分组信息".into());
        assert_eq!(list.into_vec(), vec!["表达矩阵", "样本分组信息"]);
    }
}
