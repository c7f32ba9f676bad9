//! Response templates.
//!
//! One renderer per `Template` variant, picked by a single match on the
//! classified intent. Every path returns non-empty text.

use std::fmt::Write;

use figurag_core::types::{CatalogEntry, Intent, MatchedEntry};

/// Template families. Troubleshooting and general questions share `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    ModuleRecommendation,
    ParameterHelp,
    DataPreparation,
    ResultInterpretation,
    MethodologyGuidance,
    General,
}

impl From<Intent> for Template {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::ModuleRecommendation => Template::ModuleRecommendation,
            Intent::ParameterHelp => Template::ParameterHelp,
            Intent::DataPreparation => Template::DataPreparation,
            Intent::ResultInterpretation => Template::ResultInterpretation,
            Intent::MethodologyGuidance => Template::MethodologyGuidance,
            Intent::Troubleshooting | Intent::GeneralInquiry => Template::General,
        }
    }
}

/// Example layout appended to data preparation answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    ExpressionMatrix,
    Survival,
    Unspecified,
}

impl InputLayout {
    pub fn detect(entry: &CatalogEntry) -> Self {
        let inputs = entry.input_data.join(" ");
        if inputs.contains("表达矩阵") {
            InputLayout::ExpressionMatrix
        } else if inputs.contains("生存") {
            InputLayout::Survival
        } else {
            InputLayout::Unspecified
        }
    }
}

/// Plot-specific reading guide appended to interpretation answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotGuide {
    Volcano,
    SurvivalCurve,
    Pca,
    Heatmap,
    Unspecified,
}

impl PlotGuide {
    pub fn detect(entry: &CatalogEntry) -> Self {
        let outputs = entry.output_types.join(" ");
        if outputs.contains("火山图") {
            PlotGuide::Volcano
        } else if outputs.contains("生存曲线") {
            PlotGuide::SurvivalCurve
        } else if outputs.contains("PCA图") {
            PlotGuide::Pca
        } else if outputs.contains("热图") {
            PlotGuide::Heatmap
        } else {
            PlotGuide::Unspecified
        }
    }
}

/// Workflow outline appended to methodology answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Pca,
    CoxRegression,
    Clustering,
    Generic,
}

impl Workflow {
    pub fn detect(entry: &CatalogEntry) -> Self {
        let has = |needle: &str| entry.methods.iter().any(|m| m.contains(needle));
        if has("PCA") || has("主成分") {
            Workflow::Pca
        } else if has("Cox") {
            Workflow::CoxRegression
        } else if has("聚类") {
            Workflow::Clustering
        } else {
            Workflow::Generic
        }
    }
}

pub fn render(query: &str, intent: Intent, matched: &[MatchedEntry]) -> String {
    let Some(top) = matched.first() else {
        return render_fallback(query, intent);
    };
    let entry = &top.entry;
    match Template::from(intent) {
        Template::ModuleRecommendation => module_recommendation(query, entry, &matched[1..]),
        Template::ParameterHelp => parameter_help(entry),
        Template::DataPreparation => data_preparation(entry),
        Template::ResultInterpretation => result_interpretation(entry),
        Template::MethodologyGuidance => methodology_guidance(entry),
        Template::General => general(query, entry),
    }
}

/// Explanation for a parameter name; unknown names get a generic sentence.
pub fn explain_parameter(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "pvalue" | "p.value" | "pvalue_cutoff" => "统计显著性水平，表示观察到的效应由随机机会发生的概率",
        "logfc" => "对数倍数变化，表示两组之间表达量的相对差异",
        "fdr" | "adj.p.val" => "错误发现率，多重检验校正后的p值阈值",
        "threshold" => "筛选阈值，用于过滤不符合条件的结果",
        "min_size" => "最小样本数或基因集大小要求",
        "conf_int" => "置信区间，估计参数的精确度范围",
        "resolution" => "聚类分辨率，控制聚类粒度的参数",
        "npcs" => "主成分数量，PCA中保留的维度数量",
        "method" => "分析方法的选择，决定使用的统计模型",
        "scale" => "是否将各变量缩放到单位方差",
        "center" => "是否在分析前对变量进行中心化",
        _ => "统计分析参数",
    }
}

pub fn format_parameters(entry: &CatalogEntry) -> String {
    if entry.parameters.is_empty() {
        return "使用默认参数".to_string();
    }
    entry
        .parameters
        .iter()
        .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k}={v}") })
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_module(entry: &CatalogEntry) -> &str {
    entry.modules.first().map_or("未知", String::as_str)
}

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() { empty.to_string() } else { items.join(", ") }
}

fn description(entry: &CatalogEntry) -> &str {
    if entry.description.trim().is_empty() { "暂无描述" } else { &entry.description }
}

/// Runner-up matches listed under a recommendation.
const MAX_ALTERNATIVES: usize = 2;

fn module_recommendation(query: &str, entry: &CatalogEntry, others: &[MatchedEntry]) -> String {
    let mut out = format!(
        "根据您的查询\"{query}\"，我为您推荐以下模块：\n\n\
🎯 **推荐模块**: {modules}\n\n\
📝 **功能描述**: {description}\n\n\
🔬 **技术方法**: {methods}\n\n\
💡 **使用建议**:\n\
1. 先确保您的数据格式符合要求：{input}\n\
2. 参考参数设置：{params}\n\
3. 预期输出：{output}\n\n\
🔗 **相关流程**:\n\
- 数据预处理 → 质量控制 → 主要分析 → 结果验证\n\
- 建议结合其他模块进行交叉验证\n\n",
        modules = list_or(&entry.modules, "未知"),
        description = description(entry),
        methods = list_or(&entry.methods, "未注明"),
        input = list_or(&entry.input_data, "未注明"),
        params = format_parameters(entry),
        output = list_or(&entry.output_types, "未注明"),
    );
    if !others.is_empty() {
        out.push_str("🔄 **其他相关模块**:");
        for other in others.iter().take(MAX_ALTERNATIVES) {
            let _ = write!(out, "\n- {}: {}", other.entry.topic, list_or(&other.entry.modules, "未知"));
        }
        out.push_str("\n\n");
    }
    out.push_str("需要我提供更详细的参数指导吗？");
    out
}

fn parameter_help(entry: &CatalogEntry) -> String {
    let mut out = format!("🔧 {} 参数设置指南\n\n**推荐参数设置**:", first_module(entry));
    if entry.parameters.is_empty() {
        out.push_str("\n• 该模块未列出可调参数，建议使用默认参数运行，再根据结果质量调整。");
    }
    for (name, value) in &entry.parameters {
        let meaning = explain_parameter(name);
        if value.is_empty() {
            let _ = write!(out, "\n• **{name}** - {meaning}");
        } else {
            let _ = write!(out, "\n• **{name}**: {value} - {meaning}");
        }
    }
    out.push_str(
        "\n\n**参数调整原则**:\n\
- p值阈值：更严格（0.01）减少假阳性，宽松（0.1）增加灵敏度\n\
- logFC阈值：|logFC| > 1 表示显著变化\n\
- FDR校正：多重检验校正，控制假发现率\n\n\
**验证步骤**:\n\
1. 检查数据分布和异常值\n\
2. 使用默认参数运行初步分析\n\
3. 根据结果质量调整参数\n\
4. 记录参数设置以便复现\n\n\
需要了解特定参数的生物学意义吗？",
    );
    out
}

fn data_preparation(entry: &CatalogEntry) -> String {
    let mut out = format!(
        "📋 {} 数据准备指南\n\n**数据要求**: {}\n\n**文件格式示例**:",
        first_module(entry),
        list_or(&entry.input_data, "未注明"),
    );
    match InputLayout::detect(entry) {
        InputLayout::ExpressionMatrix => out.push_str(
            "\n```\n\
Gene    Sample1    Sample2    Sample3\n\
TP53    5.2        3.8        4.1\n\
BRCA1   2.1        6.3        4.5\n\
...\n\
```\n\n\
**质量检查清单**:\n\
✅ 基因名标准化（HGNC符号）\n\
✅ 样本名一致性\n\
✅ 无缺失值过多\n\
✅ 表达量范围合理\n\
✅ 样本分组信息完整",
        ),
        InputLayout::Survival => out.push_str(
            "\n```\n\
Sample    Time    Status    Age    Sex    Treatment\n\
Patient1  365     1         65     M      DrugA\n\
Patient2  720     0         58     F      Placebo\n\
...\n\
```\n\n\
**生存数据要求**:\n\
✅ 时间单位一致（天/月/年）\n\
✅ 事件状态明确（1=事件，0=删失）\n\
✅ 协变量完整\n\
✅ 样本量充足（每组>50）",
        ),
        InputLayout::Unspecified => out.push_str(
            "\n请使用制表符分隔的文本表格，第一行为列名，第一列为样本或特征标识。",
        ),
    }
    out.push_str(
        "\n\n**预处理步骤**:\n\
1. 数据格式转换和清理\n\
2. 缺失值处理\n\
3. 异常值检测和处理\n\
4. 数据标准化或归一化\n\n\
📊 **推荐工具**:\n\
- R: `dplyr`, `tidyr`\n\
- Python: `pandas`, `numpy`\n\n\
需要具体的数据格式模板吗？",
    );
    out
}

fn result_interpretation(entry: &CatalogEntry) -> String {
    let mut out = format!(
        "📊 {} 结果解读指南\n\n**输出类型**: {}\n\n**生物学意义解读**:",
        first_module(entry),
        list_or(&entry.output_types, "统计图表"),
    );
    match PlotGuide::detect(entry) {
        PlotGuide::Volcano => out.push_str(
            "\n**火山图解读**:\n\
• **X轴**: logFC（对数倍数变化）\n  - 正值 → 上调基因\n  - 负值 → 下调基因\n  - |logFC| > 1: 2倍以上变化\n\n\
• **Y轴**: -log10(P.Value)\n  - 值越大越显著\n  - 阈值线: -log10(0.05) ≈ 1.3\n\n\
• **关键区域**:\n  - 右上角: 显著上调基因\n  - 左上角: 显著下调基因\n  - 中间: 不显著基因\n\n\
**后续分析**:\n\
1. 功能富集分析（GO/KEGG）\n\
2. 与已知标志基因比较\n\
3. 验证实验设计合理性",
        ),
        PlotGuide::SurvivalCurve => out.push_str(
            "\n**生存曲线解读**:\n\
• **曲线**: 生存概率随时间变化\n\
• **置信区间**: 结果的可靠性范围\n\
• **风险比(HR)**:\n  - HR > 1: 高风险因素\n  - HR < 1: 保护性因素\n\
• **P值**: 统计显著性\n\n\
**临床意义**:\n\
1. 识别预后因素\n\
2. 指导治疗决策\n\
3. 评估患者分层",
        ),
        PlotGuide::Pca => out.push_str(
            "\n**PCA图解读**:\n\
• **主成分**: 数据变异的主要方向\n\
• **方差解释率**: PC重要性\n\
• **样本聚类**: 组间相似性\n\
• **载荷**: 基因贡献度\n\n\
**生物学解释**:\n\
1. PC1: 可能对应最大变异源\n\
2. 样本聚类: 反映生物学分组\n\
3. 异常点: 可能的实验误差或特殊样本",
        ),
        PlotGuide::Heatmap => out.push_str(
            "\n**热图解读**:\n\
• **行**: 基因/样本\n\
• **列**: 样本/基因\n\
• **颜色**: 表达量高低（红色=高表达，蓝色=低表达）\n\
• **聚类树**: 基于表达模式的相似性聚类",
        ),
        PlotGuide::Unspecified => out.push_str(
            "\n• 先确认统计显著性，再结合效应大小判断生物学意义。",
        ),
    }
    out.push_str(
        "\n\n**报告建议**:\n\
1. 结合生物学背景解释结果\n\
2. 讨论局限性\n\
3. 提供后续验证实验建议\n\n\
需要更具体的统计学解释吗？",
    );
    out
}

fn methodology_guidance(entry: &CatalogEntry) -> String {
    let mut out = format!(
        "🔬 {} 方法学指南\n\n**分析方法**: {}\n\n**工作流程**:",
        first_module(entry),
        list_or(&entry.methods, "未注明"),
    );
    match Workflow::detect(entry) {
        Workflow::Pca => out.push_str(
            "\n1. **数据预处理**\n   - 标准化（z-score）\n   - 中心化处理\n   - 异常值检测\n\n\
2. **PCA计算**\n   - 协方差矩阵计算\n   - 特征值分解\n   - 主成分选择\n\n\
3. **结果验证**\n   - 方差解释率分析\n   - 碎石图（肘部法则）\n   - 稳定性检验",
        ),
        Workflow::CoxRegression => out.push_str(
            "\n1. **模型构建**\n   - 变量选择（逐步回归）\n   - 比例风险假设检验\n   - 多重共线性检查\n\n\
2. **模型评估**\n   - Wald检验\n   - 似然比检验\n   - 模型拟合优度\n\n\
3. **结果解释**\n   - HR值置信区间\n   - 预测曲线\n   - 校准曲线",
        ),
        Workflow::Clustering => out.push_str(
            "\n1. **距离度量**\n   - 欧几里得距离\n   - 曼哈顿距离\n   - 相关性距离\n\n\
2. **聚类算法**\n   - K-means\n   - 层次聚类\n   - DBSCAN（密度聚类）\n\n\
3. **聚类评估**\n   - 轮廓系数\n   - Calinski-Harabasz指数\n   - 内部指标验证",
        ),
        Workflow::Generic => out.push_str(
            "\n1. **数据准备**：整理输入数据并完成质量控制\n\
2. **主要分析**：按模块说明运行核心方法\n\
3. **结果验证**：交叉验证并结合生物学背景解释",
        ),
    }
    out.push_str(
        "\n\n**质量保证**:\n\
1. 数据预处理质量检查\n\
2. 方法假设验证\n\
3. 参数敏感性分析\n\
4. 结果稳定性检验\n\n\
**常见陷阱**:\n\
- 过拟合\n\
- 多重比较\n\
- 样本量不足\n\
- 数据质量问题\n\n\
需要具体的实施步骤吗？",
    );
    out
}

fn general(query: &str, entry: &CatalogEntry) -> String {
    format!(
        "关于\"{query}\"的信息：\n\n\
📚 **相关模块**: {modules}\n\n\
📖 **功能描述**: {description}\n\n\
💡 **专业建议**:\n\
这是生物医学数据分析的重要方法。建议您：\n\n\
1. **明确研究目标**: 确定要解决的科学问题\n\
2. **评估数据质量**: 检查数据完整性和可靠性\n\
3. **选择合适方法**: 根据数据类型和研究问题选择\n\
4. **验证结果**: 多种方法交叉验证\n\
5. **生物学解释**: 结合领域知识解读结果\n\n\
🔗 **相关资源**:\n\
- 查阅相关文献和最佳实践\n\
- 咨询领域专家意见\n\
- 参考已发表的高质量研究\n\n\
需要更具体的指导吗？",
        modules = list_or(&entry.modules, "未知"),
        description = description(entry),
    )
}

/// Context-free answer used when nothing matched; only echoes the query.
pub fn render_fallback(query: &str, intent: Intent) -> String {
    match intent {
        Intent::ModuleRecommendation => format!(
            "关于'{query}'的模块推荐，我建议您考虑以下方案：\n\n\
1. **差异表达分析**: FigureYa59volcanoV2 - 用于识别基因表达差异\n\
2. **数据可视化**: FigureYa9heatmap - 用于热图展示\n\
3. **统计分析**: 根据您的具体需求选择合适的统计方法\n\n\
需要更具体的建议吗？请告诉我您的数据类型和研究目标。"
        ),
        Intent::ParameterHelp => format!(
            "关于'{query}'的参数设置，一般性建议：\n\n\
• **p值阈值**: 通常设为0.05\n\
• **多重检验**: 使用FDR校正\n\
• **效应大小**: 根据生物学意义设定阈值\n\
• **样本量**: 确保统计功效充足\n\n\
需要针对特定方法的详细指导吗？"
        ),
        Intent::DataPreparation => format!(
            "关于'{query}'的数据准备，基本要求：\n\n\
1. **数据格式**: 确保使用标准的表格格式\n\
2. **质量检查**: 检查缺失值和异常值\n\
3. **数据标准化**: 根据分析方法需要预处理\n\
4. **元数据**: 完善的样本信息\n\n\
您的数据类型是什么？我可以提供更具体的指导。"
        ),
        Intent::ResultInterpretation => format!(
            "关于'{query}'的结果解读，通用原则：\n\n\
1. **统计显著性**: 关注p值和置信区间\n\
2. **效应大小**: 区分统计显著性和生物学意义\n\
3. **多重比较**: 考虑多重检验校正\n\
4. **生物学验证**: 结合领域知识解释结果\n\n\
需要具体图表类型的解读指南吗？"
        ),
        Intent::MethodologyGuidance => format!(
            "关于'{query}'的方法学指导，建议流程：\n\n\
1. **方法选择**: 根据数据类型和研究问题\n\
2. **假设检验**: 设定合适的零假设和备择假设\n\
3. **统计分析**: 选择合适的统计检验方法\n\
4. **结果验证**: 进行敏感性分析和稳健性检验\n\n\
需要具体分析方法的详细步骤吗？"
        ),
        Intent::Troubleshooting => format!(
            "关于'{query}'的问题排查，建议按以下顺序检查：\n\n\
1. **报错信息**: 完整记录错误输出，定位出错的代码行\n\
2. **R包版本**: 确认依赖包已安装且版本匹配\n\
3. **输入数据**: 检查文件路径、列名和数据类型\n\
4. **示例数据**: 先用模块自带的示例数据跑通流程\n\n\
可以把完整的报错信息发给我吗？"
        ),
        Intent::GeneralInquiry => format!(
            "关于'{query}'，我可以提供以下信息：\n\n\
这是一个生物医学数据分析相关的问题。建议您：\n\
1. 明确具体的研究问题\n\
2. 说明数据类型和规模\n\
3. 确定分析目标\n\
4. 我可以为您提供针对性的方法建议\n\n\
请提供更多详细信息以便我给出更准确的建议。"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figurag_core::catalog::Catalog;
    use figurag_core::types::SourceKind;

    fn matched(entry: &CatalogEntry) -> Vec<MatchedEntry> {
        vec![MatchedEntry { id: entry.topic.clone(), score: 10.0, source: SourceKind::Keyword, entry: entry.clone() }]
    }

    #[test]
    fn every_intent_renders_non_empty_text() {
        let catalog = Catalog::builtin();
        for intent in Intent::ALL {
            assert!(!render("q", intent, &[]).is_empty());
            for entry in catalog.entries() {
                assert!(!render("q", intent, &matched(entry)).is_empty());
            }
            assert!(!render("q", intent, &matched(&CatalogEntry::default())).is_empty());
        }
    }

    #[test]
    fn parameter_help_lists_each_parameter() {
        let catalog = Catalog::builtin();
        let entry = catalog.get("差异表达分析").expect("entry");
        let text = render("q", Intent::ParameterHelp, &matched(entry));
        assert!(text.contains("**pvalue**: 0.05"));
        assert!(text.contains("对数倍数变化"));
        assert!(text.starts_with("🔧 FigureYa59volcanoV2"));
    }

    #[test]
    fn recommendation_lists_up_to_two_runner_ups() {
        let catalog = Catalog::builtin();
        let several: Vec<MatchedEntry> = catalog.entries().iter().flat_map(matched).collect();
        assert!(several.len() >= 4);

        let text = render("q", Intent::ModuleRecommendation, &several);
        assert!(text.contains("🔄 **其他相关模块**"));
        for other in &several[1..3] {
            assert!(text.contains(&format!("- {}: {}", other.entry.topic, other.entry.modules.join(", "))));
        }
        assert!(!text.contains(&format!("- {}:", several[3].entry.topic)));
        assert!(text.ends_with("需要我提供更详细的参数指导吗？"));

        let single = render("q", Intent::ModuleRecommendation, &several[..1]);
        assert!(!single.contains("其他相关模块"));
    }

    #[test]
    fn unknown_parameter_gets_generic_explanation() {
        assert_eq!(explain_parameter("alpha"), "统计分析参数");
        assert_eq!(explain_parameter("nPCs"), explain_parameter("npcs"));
    }

    #[test]
    fn branches_follow_entry_content() {
        let catalog = Catalog::builtin();
        let get = |t: &str| catalog.get(t).expect("entry").clone();
        assert_eq!(InputLayout::detect(&get("差异表达分析")), InputLayout::ExpressionMatrix);
        assert_eq!(InputLayout::detect(&get("生存分析")), InputLayout::Survival);
        assert_eq!(PlotGuide::detect(&get("差异表达分析")), PlotGuide::Volcano);
        assert_eq!(PlotGuide::detect(&get("单细胞分析")), PlotGuide::Heatmap);
        assert_eq!(PlotGuide::detect(&get("PCA分析")), PlotGuide::Pca);
        assert_eq!(Workflow::detect(&get("PCA分析")), Workflow::Pca);
        assert_eq!(Workflow::detect(&get("生存分析")), Workflow::CoxRegression);
        assert_eq!(Workflow::detect(&get("单细胞分析")), Workflow::Clustering);
        assert_eq!(Workflow::detect(&get("差异表达分析")), Workflow::Generic);
    }

    #[test]
    fn fallback_echoes_query() {
        let text = render("量子计算", Intent::Troubleshooting, &[]);
        assert!(text.contains("'量子计算'"));
    }
}
