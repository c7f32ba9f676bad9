//! Display confidence. A heuristic for the UI, not a calibrated probability.
//!
//! The precise-intent bonus only applies on top of a match, so an answer
//! with nothing matched never rises above the base value.

use figurag_core::types::{Intent, MatchedEntry};

pub const BASE_CONFIDENCE: f32 = 0.7;
pub const MATCH_BONUS: f32 = 0.2;
pub const PRECISE_INTENT_BONUS: f32 = 0.1;
pub const CONFIDENCE_CEILING: f32 = 0.95;

pub fn confidence(intent: Intent, matched: &[MatchedEntry]) -> f32 {
    if matched.is_empty() {
        return BASE_CONFIDENCE;
    }
    let mut value = BASE_CONFIDENCE + MATCH_BONUS;
    if matches!(intent, Intent::ModuleRecommendation | Intent::ParameterHelp) {
        value += PRECISE_INTENT_BONUS;
    }
    value.min(CONFIDENCE_CEILING)
}

/// Per-intent follow-ups, plus the top module when something matched.
pub fn next_steps(intent: Intent, matched: &[MatchedEntry]) -> Vec<String> {
    let steps: &[&str] = match intent {
        Intent::ModuleRecommendation => &["查看模块详细文档", "准备所需数据格式", "设置合适参数"],
        Intent::ParameterHelp => &["验证参数合理性", "运行敏感性分析", "记录参数设置"],
        Intent::DataPreparation => &["检查数据质量", "进行数据预处理", "验证数据格式"],
        Intent::Troubleshooting => &["保存完整报错信息", "检查R包版本", "用示例数据复现问题"],
        Intent::ResultInterpretation | Intent::MethodologyGuidance | Intent::GeneralInquiry => &[],
    };
    let mut out: Vec<String> = steps.iter().map(|s| (*s).to_string()).collect();
    if let Some(top) = matched.first() {
        let module = top.entry.modules.first().map_or("相关模块", String::as_str);
        out.push(format!("使用 {module} 进行分析"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use figurag_core::types::{CatalogEntry, SourceKind};

    fn one_match() -> Vec<MatchedEntry> {
        let entry = CatalogEntry { modules: vec!["FigureYa38PCA".into()], ..CatalogEntry::default() };
        vec![MatchedEntry { id: "PCA分析".into(), score: 1.0, source: SourceKind::Keyword, entry }]
    }

    #[test]
    fn bounded_and_monotone_in_matches() {
        for intent in Intent::ALL {
            let without = confidence(intent, &[]);
            let with = confidence(intent, &one_match());
            assert!(with >= without);
            assert!((0.0..=CONFIDENCE_CEILING).contains(&with));
        }
    }

    #[test]
    fn no_match_stays_at_or_below_base() {
        assert!(confidence(Intent::GeneralInquiry, &[]) <= BASE_CONFIDENCE);
        assert!(confidence(Intent::ModuleRecommendation, &[]) <= BASE_CONFIDENCE);
    }

    #[test]
    fn ceiling_applies_to_precise_intents() {
        assert_eq!(confidence(Intent::ParameterHelp, &one_match()), CONFIDENCE_CEILING);
    }

    #[test]
    fn next_steps_name_top_module() {
        let steps = next_steps(Intent::GeneralInquiry, &one_match());
        assert_eq!(steps, vec!["使用 FigureYa38PCA 进行分析"]);
        assert_eq!(next_steps(Intent::DataPreparation, &[]).len(), 3);
    }
}
