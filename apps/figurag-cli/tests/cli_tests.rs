use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::fs;
use std::sync::Arc;

use figurag_cli::display::{format_answer, format_matches};
use figurag_cli::env_file::{load_env_file, upsert_key};
use figurag_cli::server::{self, AppState, ChatRequest, SearchParams};
use figurag_core::catalog::Catalog;
use figurag_engine::{Knowledge, RagEngine};

fn state() -> AppState {
    AppState::new(Arc::new(RagEngine::new(Knowledge::Catalog(Catalog::builtin()))))
}

#[test]
fn upsert_replaces_existing_key_and_keeps_others() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "# keys\nOPENAI_API_KEY=old\nOTHER=1\n").unwrap();

    upsert_key(&path, "OPENAI_API_KEY", "sk-new").unwrap();
    upsert_key(&path, "ZHIPUAI_API_KEY", "abc.def").unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "# keys\nOPENAI_API_KEY=sk-new\nOTHER=1\nZHIPUAI_API_KEY=abc.def\n");
}

#[test]
fn upsert_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    upsert_key(&path, "ZHIPUAI_API_KEY", "k").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "ZHIPUAI_API_KEY=k\n");
}

#[test]
fn env_file_does_not_override_existing_variables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "FIGURAG_TEST_PRESET=from_file\nFIGURAG_TEST_FRESH=\"fresh value\"\n").unwrap();
    std::env::set_var("FIGURAG_TEST_PRESET", "from_env");

    assert_eq!(load_env_file(&path).unwrap(), 1);
    assert_eq!(std::env::var("FIGURAG_TEST_PRESET").unwrap(), "from_env");
    assert_eq!(std::env::var("FIGURAG_TEST_FRESH").unwrap(), "fresh value");
    assert_eq!(load_env_file(&dir.path().join("missing.env")).unwrap(), 0);
}

#[test]
fn terminal_output_lists_modules_and_steps() {
    let engine = RagEngine::new(Knowledge::Catalog(Catalog::builtin()));
    let text = format_answer(&engine.ask("生存分析的参数如何设置"));
    assert!(text.contains("parameter_help"));
    assert!(text.contains("FigureYa36nSurvV3"));
    assert!(text.contains("下一步"));
    assert!(format_matches(&[]).contains("没有找到"));
}

#[tokio::test]
async fn search_endpoint_caps_limit_and_rejects_empty() {
    let Json(body) = server::search(
        State(state()),
        Query(SearchParams { q: Some("分析".into()), limit: Some(100) }),
    )
    .await
    .unwrap();
    assert_eq!(body["count"], 4);
    assert_eq!(body["query"], "分析");

    let err = server::search(State(state()), Query(SearchParams::default())).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_endpoint_returns_query_result() {
    let Json(result) = server::chat(
        State(state()),
        Json(ChatRequest { message: " 火山图怎么解读 ".into() }),
    )
    .await
    .unwrap();
    assert_eq!(result.query, "火山图怎么解读");
    assert_eq!(result.matched_entries[0].entry.topic, "差异表达分析");

    let err = server::chat(State(state()), Json(ChatRequest { message: "  ".into() })).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_status_report_engine() {
    let Json(health) = server::health(State(state())).await;
    assert_eq!(health["status"], "healthy");
    let Json(status) = server::status(State(state())).await;
    assert_eq!(status["knowledgeSize"], 4);
    assert_eq!(status["source"], "catalog");
}
