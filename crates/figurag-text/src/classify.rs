//! Intent classification by keyword counting.
//!
//! Each label scores the number of its keywords that occur as substrings of
//! the lower-cased query. The strictly highest score wins; a tie for the top
//! score, or no hit at all, yields `Intent::GeneralInquiry`.

use figurag_core::types::Intent;

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::ModuleRecommendation,
        &["推荐", "建议", "哪个", "用什么", "用哪个", "应该用", "如何选择", "recommend", "suggest", "which module"],
    ),
    (
        Intent::ParameterHelp,
        &["参数", "设置", "配置", "如何设置", "如何调整", "什么参数", "阈值", "parameter", "threshold", "cutoff"],
    ),
    (
        Intent::DataPreparation,
        &["数据格式", "输入", "准备", "需要什么", "格式", "input", "format", "prepare"],
    ),
    (
        Intent::ResultInterpretation,
        &["解释", "理解", "意思", "意义", "怎么看", "如何解读", "说明", "interpret", "explain", "meaning"],
    ),
    (
        Intent::MethodologyGuidance,
        &["方法", "流程", "步骤", "怎么做", "method", "workflow", "pipeline", "step"],
    ),
    (
        Intent::Troubleshooting,
        &["错误", "失败", "报错", "不work", "问题", "bug", "error", "fail"],
    ),
];

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    table: Vec<(Intent, Vec<String>)>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        let table = INTENT_KEYWORDS
            .iter()
            .map(|(intent, kws)| (*intent, kws.iter().map(|k| k.to_lowercase()).collect()))
            .collect();
        Self { table }
    }
}

impl IntentClassifier {
    pub fn new() -> Self { Self::default() }

    /// Custom table, checked in the given order. `GeneralInquiry` stays the default.
    pub fn with_table(table: Vec<(Intent, Vec<String>)>) -> Self {
        let table = table
            .into_iter()
            .map(|(intent, kws)| (intent, kws.into_iter().map(|k| k.to_lowercase()).collect()))
            .collect();
        Self { table }
    }

    /// Per-label hit counts in table order.
    pub fn scores(&self, query: &str) -> Vec<(Intent, usize)> {
        let query = query.to_lowercase();
        self.table
            .iter()
            .map(|(intent, kws)| (*intent, kws.iter().filter(|k| !k.is_empty() && query.contains(k.as_str())).count()))
            .collect()
    }

    pub fn classify(&self, query: &str) -> Intent {
        let mut best = Intent::GeneralInquiry;
        let mut best_score = 0usize;
        let mut tied = false;
        for (intent, score) in self.scores(query) {
            if score > best_score {
                best = intent;
                best_score = score;
                tied = false;
            } else if score == best_score && score > 0 {
                tied = true;
            }
        }
        if tied { Intent::GeneralInquiry } else { best }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_queries() {
        let c = IntentClassifier::new();
        assert_eq!(c.classify("RNA-seq差异表达分析推荐什么模块？"), Intent::ModuleRecommendation);
        assert_eq!(c.classify("生存分析的参数如何设置"), Intent::ParameterHelp);
        assert_eq!(c.classify("如何解释火山图的结果？"), Intent::ResultInterpretation);
        assert_eq!(c.classify("单细胞分析的方法流程是什么？"), Intent::MethodologyGuidance);
        assert_eq!(c.classify("PCA分析需要什么数据？"), Intent::DataPreparation);
        assert_eq!(c.classify("运行时报错了"), Intent::Troubleshooting);
    }

    #[test]
    fn no_hits_and_ties_fall_back_to_general() {
        let c = IntentClassifier::new();
        assert_eq!(c.classify(""), Intent::GeneralInquiry);
        assert_eq!(c.classify("hello"), Intent::GeneralInquiry);
        // one parameter keyword, one interpretation keyword
        assert_eq!(c.classify("参数的意义"), Intent::GeneralInquiry);
    }

    #[test]
    fn parameter_phrasing_beats_module_phrasing() {
        let c = IntentClassifier::new();
        // "用什么" is a recommendation cue; "什么参数" tips it to parameters.
        assert_eq!(c.classify("聚类用什么参数比较好"), Intent::ParameterHelp);
        let scores = c.scores("聚类用什么参数比较好");
        assert!(scores.contains(&(Intent::ParameterHelp, 2)));
        assert!(scores.contains(&(Intent::ModuleRecommendation, 1)));
    }

    #[test]
    fn matching_ignores_case() {
        let c = IntentClassifier::new();
        assert_eq!(c.classify("Which PARAMETER should I use"), Intent::ParameterHelp);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = IntentClassifier::new();
        for q in ["推荐一个模块", "数据格式说明", "pipeline error", "随便问问"] {
            assert_eq!(c.classify(q), c.classify(q));
        }
    }
}
