//! HTTP surface over `RagEngine`.
//!
//! The engine is synchronous and may block on remote providers, so every
//! engine call runs on the blocking pool.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use figurag_core::types::QueryResult;
use figurag_engine::RagEngine;

pub const MAX_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RagEngine>,
    pub started: Instant,
}

impl AppState {
    pub fn new(engine: Arc<RagEngine>) -> Self {
        Self { engine, started: Instant::now() }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.to_string()),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/search", get(search))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp,
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.engine.status()))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty query"));
    }
    let limit = params.limit.unwrap_or(0).min(MAX_LIMIT);
    let engine = state.engine.clone();
    let q = query.clone();
    let results = tokio::task::spawn_blocking(move || engine.retrieve(&q, limit))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(json!({ "query": query, "count": results.len(), "results": results })))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Empty message"));
    }
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.ask(&message))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(result))
}
