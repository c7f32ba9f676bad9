//! Plain-text rendering of engine results for the terminal.

use std::fmt::Write;

use figurag_core::types::{MatchedEntry, QueryResult, ResponseOrigin};
use figurag_engine::EngineStatus;

pub fn format_answer(result: &QueryResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", result.response);
    let origin = match result.origin {
        ResponseOrigin::Llm => "LLM",
        ResponseOrigin::Template => "template",
    };
    let _ = writeln!(out, "意图: {}  置信度: {:.2}  来源: {origin}", result.intent, result.confidence);
    let modules: Vec<&str> = result
        .matched_entries
        .iter()
        .flat_map(|m| m.entry.modules.iter().map(String::as_str))
        .collect();
    if !modules.is_empty() {
        let _ = writeln!(out, "相关模块: {}", modules.join(", "));
    }
    if !result.next_steps.is_empty() {
        let _ = writeln!(out, "下一步:");
        for step in &result.next_steps {
            let _ = writeln!(out, "  - {step}");
        }
    }
    out
}

pub fn format_matches(matches: &[MatchedEntry]) -> String {
    if matches.is_empty() {
        return "没有找到相关模块。\n".to_string();
    }
    let mut out = String::new();
    for (i, m) in matches.iter().enumerate() {
        let _ = writeln!(out, "{}. {} (score {:.2}, {:?})", i + 1, m.entry.topic, m.score, m.source);
        if !m.entry.modules.is_empty() {
            let _ = writeln!(out, "   模块: {}", m.entry.modules.join(", "));
        }
        if !m.entry.description.is_empty() {
            let _ = writeln!(out, "   {}", m.entry.description);
        }
    }
    out
}

pub fn format_status(status: &EngineStatus) -> String {
    format!(
        "知识库: {} ({} 条)\n向量: {}\n大模型: {}\n功能: {}",
        status.source,
        status.knowledge_size,
        status.embeddings.as_deref().unwrap_or("未启用"),
        status.llm.as_deref().unwrap_or("未启用 (模板回答)"),
        status.features.join(", "),
    )
}
