use std::fs;
use std::path::Path;
use tempfile::TempDir;

use figurag_core::catalog::Catalog;
use figurag_core::types::CatalogEntry;
use figurag_text::{CorpusReport, Ingestor, RelevanceScorer, ScoreWeights};

#[test]
fn query_containing_topic_name_ranks_that_topic_first() {
    let catalog = Catalog::builtin();
    let scorer = RelevanceScorer::default();
    for entry in catalog.entries() {
        for query in [
            entry.topic.clone(),
            format!("{}的参数如何设置", entry.topic),
            format!("请介绍一下{}", entry.topic),
        ] {
            let hits = scorer.rank(&query, catalog.entries(), 5);
            assert_eq!(hits.first().map(|h| h.id.as_str()), Some(entry.topic.as_str()), "query {query}");
        }
    }
}

#[test]
fn named_topic_leads_even_when_other_entries_collect_more_signals() {
    let catalog = Catalog::builtin();
    let scorer = RelevanceScorer::default();
    for (query, expected) in [
        ("生存分析 DESeq2 edgeR limma 火山图 热图", "生存分析"),
        ("PCA分析 单细胞 UMAP tSNE 聚类 质控", "PCA分析"),
        ("单细胞分析 Kaplan-Meier Cox回归 生存曲线 预后", "单细胞分析"),
        ("差异表达分析 主成分分析 PCA 降维 可视化", "差异表达分析"),
    ] {
        let hits = scorer.rank(query, catalog.entries(), 5);
        assert_eq!(hits.first().map(|h| h.id.as_str()), Some(expected), "query {query}");
        assert!(hits.len() > 1, "query {query} should also match a competing topic");
    }
}

#[test]
fn unrelated_query_matches_nothing() {
    let catalog = Catalog::builtin();
    let hits = RelevanceScorer::default().rank("weather forecast tomorrow", catalog.entries(), 5);
    assert!(hits.is_empty());
}

#[test]
fn output_type_query_finds_owner() {
    let catalog = Catalog::builtin();
    let hits = RelevanceScorer::default().rank("如何解释火山图的结果？", catalog.entries(), 5);
    assert_eq!(hits[0].id, "差异表达分析");
}

#[test]
fn rank_truncates_and_sorts_descending() {
    let catalog = Catalog::builtin();
    let hits = RelevanceScorer::default().rank("分析 降维 聚类 生存 PCA", catalog.entries(), 2);
    assert!(hits.len() <= 2);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn one_term_counts_in_several_signals() {
    let entry = CatalogEntry {
        topic: "热图".into(),
        output_types: vec!["热图".into()],
        keywords: vec!["热图".into()],
        ..CatalogEntry::default()
    };
    let w = ScoreWeights::default();
    let score = RelevanceScorer::default().score("热图", &entry);
    assert_eq!(score, w.exact + w.title + w.output + w.domain);
}

#[test]
fn signal_weights_keep_their_order() {
    let w = ScoreWeights::default();
    assert!(w.exact > w.title && w.title > w.method && w.method > w.input);
    assert!(w.input > w.output && w.output > w.domain && w.domain > 0.0);
}

#[test]
fn oversized_paragraph_becomes_one_chunk() {
    let paragraph = "差异表达分析的火山图展示。".repeat(60);
    let chunks = Ingestor::with_max_chars(100).ingest(&paragraph, Path::new("big.txt"));
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].text.chars().count() > 100);
    assert_eq!(chunks[0].total_chunks, 1);
}

#[test]
fn chunks_keep_order_and_provenance() {
    let text = (0..6).map(|i| format!("第{i}段 survival 分析说明文字")).collect::<Vec<_>>().join("\n\n");
    let chunks = Ingestor::with_max_chars(40).ingest(&text, Path::new("/data/FigureYa1survivalCurve.md"));
    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.doc_id, "FigureYa1survivalCurve");
        assert_eq!(chunk.id, format!("FigureYa1survivalCurve:{i}"));
        assert_eq!(chunk.total_chunks, chunks.len());
        assert!(chunk.text.chars().count() <= 40);
        // no heading anywhere, so every chunk inherits the file stem
        assert_eq!(chunk.tags.title, "FigureYa1survivalCurve");
    }
    assert!(chunks[0].text.starts_with("第0段"));
}

#[test]
fn chunk_list_survives_serialization_without_losing_text() {
    let text = "# FigureYa38PCA\n\nPCA 主成分分析展示样本聚类。\n\n标准化表达矩阵作为输入。";
    let chunks = Ingestor::with_max_chars(30).ingest(text, Path::new("pca.md"));
    let json = serde_json::to_string(&chunks).unwrap();
    let back: Vec<figurag_core::DocumentChunk> = serde_json::from_str(&json).unwrap();
    let count = |s: &str| s.chars().filter(|c| !c.is_whitespace()).count();
    let total: usize = back.iter().map(|c| count(&c.text)).sum();
    assert_eq!(total, count(text));
    assert_eq!(back, chunks);
}

#[test]
fn ingest_directory_skips_bad_units_and_continues() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let body = "# FigureYa9heatmap\n\n需求描述\n用热图展示 RNA-seq 表达矩阵的聚类结果。\n\nlibrary(pheatmap)\nscale = \"row\"\n";
    fs::write(dir.join("a.txt"), body).unwrap();
    fs::write(dir.join("b.txt"), [0xffu8, 0xfe, 0xfd, 0x00, 0x80]).unwrap();
    fs::write(dir.join("c.txt"), "tiny").unwrap();
    fs::create_dir(dir.join("sub")).unwrap();
    fs::write(dir.join("sub/a.txt"), body).unwrap();

    let report = Ingestor::default().ingest_directory(dir, None).expect("ingest");
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.skipped_count(), 2);
    let doc_ids: std::collections::BTreeSet<_> = report.chunks.iter().map(|c| c.doc_id.clone()).collect();
    assert_eq!(doc_ids.into_iter().collect::<Vec<_>>(), vec!["a", "a-2"]);
    let first = &report.chunks[0];
    assert_eq!(first.tags.title, "FigureYa9heatmap");
    assert!(first.tags.output_types.contains(&"热图".to_string()));
    assert!(first.tags.parameters.contains(&"scale".to_string()));

    let summary = CorpusReport::from_ingest(&report);
    assert_eq!(summary.total_documents, 2);
    assert_eq!(summary.skipped_files, 2);
    assert!(summary.to_markdown().contains("表达矩阵: 2"));
}

#[test]
fn ingest_directory_reports_missing_root() {
    let tmp = TempDir::new().unwrap();
    assert!(Ingestor::default().ingest_directory(&tmp.path().join("missing"), None).is_err());
}
