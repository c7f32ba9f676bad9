//! Dictionary and regex extractors that label a chunk of FigureYa text.

use regex::Regex;
use std::sync::LazyLock;

use figurag_core::types::ChunkTags;

use crate::contains_keyword;

type Dictionary = &'static [(&'static str, &'static [&'static str])];

const INPUT_TYPES: Dictionary = &[
    ("RNA-seq", &["RNA-seq", "RNAseq", "转录组"]),
    ("DNA-seq", &["DNA-seq", "DNAseq", "基因组", "全基因组"]),
    ("ChIP-seq", &["ChIP-seq", "ChIPseq", "染色质免疫沉淀"]),
    ("单细胞", &["单细胞", "scRNA-seq", "single cell", "10x"]),
    ("蛋白质组", &["蛋白质组", "proteomics", "质谱"]),
    ("代谢组", &["代谢组", "metabolomics"]),
    ("临床数据", &["临床", "TCGA", "GEO", "病人", "样本"]),
    ("表达矩阵", &["表达矩阵", "expression matrix", "FPKM", "TPM"]),
    ("突变数据", &["突变", "mutation", "SNV", "CNV"]),
    ("生存数据", &["生存", "survival", "OS", "PFS"]),
];

const OUTPUT_TYPES: Dictionary = &[
    ("热图", &["热图", "heatmap", "聚类图"]),
    ("火山图", &["火山图", "volcano", "差异表达"]),
    ("PCA图", &["PCA", "主成分", "降维"]),
    ("生存曲线", &["生存曲线", "survival", "Kaplan"]),
    ("箱线图", &["箱线图", "boxplot", "violin"]),
    ("散点图", &["散点图", "scatter", "correlation"]),
    ("网络图", &["网络", "network", "PPI", "互作"]),
    ("基因组浏览器", &["IGV", "genome browser", "基因组视图"]),
    ("统计表格", &["表格", "table", "统计"]),
];

const METHODS: Dictionary = &[
    ("差异表达分析", &["差异表达", "differential expression", "DEG", "limma"]),
    ("聚类分析", &["聚类", "clustering", "hierarchical", "k-means"]),
    ("生存分析", &["生存分析", "cox", "logrank", "kaplan"]),
    ("通路分析", &["通路", "pathway", "GSEA", "富集"]),
    ("质量控制", &["质控", "QC", "质量控制", "quality"]),
    ("标准化", &["标准化", "normalization", "FPKM", "TPM"]),
    ("主成分分析", &["PCA", "主成分", "principal component"]),
    ("网络分析", &["网络分析", "network", "PPI", "STRING"]),
    ("motif分析", &["motif", "TF", "转录因子"]),
];

const BIOLOGY_AREAS: Dictionary = &[
    ("癌症研究", &["癌症", "cancer", "tumor", "TCGA"]),
    ("免疫学", &["免疫", "immune", "T细胞", "B细胞"]),
    ("神经科学", &["神经", "neuron", "brain"]),
    ("心血管", &["心脏", "心血管", "cardiovascular"]),
    ("代谢疾病", &["代谢", "糖尿病", "obesity"]),
    ("感染性疾病", &["感染", "病毒", "细菌"]),
    ("发育生物学", &["发育", "胚胎", "stem cell"]),
    ("药物研究", &["药物", "drug", "treatment"]),
];

const COMPLEXITY_LEVELS: Dictionary = &[
    ("高级", &["高级", "复杂", "多步骤", "综合"]),
    ("中级", &["中级", "常规", "标准"]),
    ("初级", &["简单", "基础", "入门", "快速"]),
];

const DESCRIPTION_MARKERS: &[&str] = &["需求描述", "应用场景", "功能", "分析", "可视化", "展示"];

const COMMON_PARAMETERS: &[&str] = &["pvalue", "adj.P.Val", "logFC", "FDR", "threshold", "min_size"];

const MAX_PARAMETERS: usize = 10;

static HEADING_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^#{1,3}\s+(.+)$").ok());
static CAPITALIZED_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Z][^.!?]*[.!?]?$").ok());
static ASSIGNMENT_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(?:"[^"\n]*"|'[^'\n]*'|[A-Za-z0-9_.\-]+)"#).ok()
});

/// Stateless; every extractor is a pure function of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagExtractor;

impl TagExtractor {
    pub fn new() -> Self { Self }

    pub fn extract(&self, text: &str) -> ChunkTags {
        let lower = text.to_lowercase();
        ChunkTags {
            title: self.title(text).unwrap_or_default(),
            description: self.description(text),
            input_types: match_dictionary(&lower, INPUT_TYPES),
            output_types: match_dictionary(&lower, OUTPUT_TYPES),
            methods: match_dictionary(&lower, METHODS),
            biology_areas: match_dictionary(&lower, BIOLOGY_AREAS),
            complexity: self.complexity(text),
            parameters: self.parameters(text),
        }
    }

    /// First plausible heading within the first ten lines.
    pub fn title(&self, text: &str) -> Option<String> {
        for line in text.lines().take(10) {
            let line = line.trim();
            if line.is_empty() || line.chars().count() >= 100 {
                continue;
            }
            if let Some(caps) = HEADING_RE.as_ref().and_then(|re| re.captures(line)) {
                return Some(caps[1].trim().to_string());
            }
            if line.contains("FigureYa") || CAPITALIZED_RE.as_ref().is_some_and(|re| re.is_match(line)) {
                return Some(line.to_string());
            }
        }
        None
    }

    /// Up to three non-heading lines following the first line that mentions
    /// a description marker. Empty when no marker is present.
    pub fn description(&self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let Some(start) = lines.iter().position(|l| DESCRIPTION_MARKERS.iter().any(|m| l.contains(m))) else {
            return String::new();
        };
        lines[start + 1..]
            .iter()
            .take(4)
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .take(3)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn complexity(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        for (level, keywords) in COMPLEXITY_LEVELS {
            if keywords.iter().any(|k| lower.contains(k)) {
                return (*level).to_string();
            }
        }
        let packages = text
            .lines()
            .filter(|l| {
                let l = l.trim_start();
                l.starts_with("library(") || l.starts_with("require(")
            })
            .count();
        let level = match packages {
            n if n > 10 => "高级",
            n if n > 5 => "中级",
            _ => "初级",
        };
        level.to_string()
    }

    /// Assigned names in order of first appearance, then well-known
    /// parameters mentioned anywhere; at most ten.
    pub fn parameters(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if name.chars().count() > 1 && !found.iter().any(|f| f == name) {
                found.push(name.to_string());
            }
        };
        if let Some(re) = ASSIGNMENT_RE.as_ref() {
            for caps in re.captures_iter(text) {
                push(&caps[1]);
            }
        }
        let lower = text.to_lowercase();
        for param in COMMON_PARAMETERS {
            if lower.contains(&param.to_lowercase()) {
                push(*param);
            }
        }
        found.truncate(MAX_PARAMETERS);
        found
    }
}

fn match_dictionary(lower: &str, dictionary: Dictionary) -> Vec<String> {
    dictionary
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| contains_keyword(lower, k)))
        .map(|(label, _)| (*label).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# FigureYa59volcanoV2\n\n需求描述\n用火山图展示 RNA-seq 差异表达结果，标注 TCGA 肿瘤样本中的显著基因。\n\n\
library(ggplot2)\nlibrary(ggrepel)\npvalue = 0.05\nlogFCcut <- 1\nlabel_size = \"small\"\n";

    #[test]
    fn extracts_all_tag_families() {
        let tags = TagExtractor::new().extract(SAMPLE);
        assert_eq!(tags.title, "FigureYa59volcanoV2");
        assert!(tags.description.starts_with("用火山图展示"));
        assert!(tags.input_types.contains(&"RNA-seq".to_string()));
        assert!(tags.input_types.contains(&"临床数据".to_string()));
        assert!(tags.output_types.contains(&"火山图".to_string()));
        assert!(tags.methods.contains(&"差异表达分析".to_string()));
        assert_eq!(tags.biology_areas, vec!["癌症研究"]);
        assert_eq!(tags.complexity, "初级");
        assert_eq!(tags.parameters, vec!["pvalue", "label_size", "logFC"]);
    }

    #[test]
    fn complexity_prefers_keywords_then_library_count() {
        let t = TagExtractor::new();
        assert_eq!(t.complexity("这是一个综合流程"), "高级");
        let libs = (0..7).map(|i| format!("library(pkg{i})")).collect::<Vec<_>>().join("\n");
        assert_eq!(t.complexity(&libs), "中级");
    }

    #[test]
    fn title_absent_for_plain_lowercase_text() {
        assert_eq!(TagExtractor::new().title("just some notes\nmore notes"), None);
    }

    #[test]
    fn comparison_operators_are_not_assignments() {
        assert!(TagExtractor::new().parameters("if (a == b) x <= 3").is_empty());
    }
}
