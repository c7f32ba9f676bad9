use std::fmt::Write;

use figurag_core::types::MatchedEntry;

use crate::render::format_parameters;

pub const SYSTEM_PROMPT: &str = "你是一个专业的生物医学数据分析专家，基于FigureYa知识库回答用户的问题。\n\n\
请根据提供的上下文信息，专业、准确地回答用户的问题。回答要求：\n\
1. 基于上下文信息，不要编造内容\n\
2. 给出具体的分析步骤和参数建议\n\
3. 使用中文回答\n\
4. 保持专业但易懂的语气\n\
5. 如果上下文不足，诚实地说明局限性";

const CONTEXT_ENTRIES: usize = 3;

pub fn user_prompt(query: &str, matched: &[MatchedEntry]) -> String {
    let mut context = String::new();
    for (i, m) in matched.iter().take(CONTEXT_ENTRIES).enumerate() {
        let e = &m.entry;
        let _ = writeln!(context, "{}. {}", i + 1, e.topic);
        let _ = writeln!(context, "   模块: {}", e.modules.join(", "));
        let _ = writeln!(context, "   描述: {}", e.description);
        let _ = writeln!(context, "   方法: {}", e.methods.join(", "));
        let _ = writeln!(context, "   输入: {}", e.input_data.join(", "));
        let _ = writeln!(context, "   输出: {}", e.output_types.join(", "));
        let _ = writeln!(context, "   参数: {}", format_parameters(e));
    }
    format!("用户问题：{query}\n\n相关知识库上下文：\n{context}\n请基于以上信息回答用户的问题。")
}
