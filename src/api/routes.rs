//! REST endpoints for snippet ingestion and dry-run classification.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::processor::{IngestOutcome, LifelogPipeline};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LifelogPipeline>,
}

/// Build the Axum router.
pub fn api_routes(pipeline: Arc<LifelogPipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/health", get(health))
        .route("/api/log", post(log_snippet))
        .route("/api/classify", post(classify))
        .route("/api/sections/resolve", get(resolve_section))
        .route("/api/queue", get(list_queue))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lifelog-router"
    }))
}

// ── Ingest ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LogRequest {
    text: String,
    #[serde(default)]
    source: Option<String>,
}

/// POST /api/log
///
/// 201 with the created page, 202 when the page was queued for retry,
/// 404 when the target section does not exist.
async fn log_snippet(State(state): State<AppState>, Json(req): Json<LogRequest>) -> Response {
    match state.pipeline.ingest(&req.text, req.source.as_deref()).await {
        Ok(outcome @ IngestOutcome::Created { .. }) => {
            info!(category = %outcome.routed().category, "Snippet logged");
            (StatusCode::CREATED, Json(outcome)).into_response()
        }
        Ok(outcome @ IngestOutcome::Queued { .. }) => {
            (StatusCode::ACCEPTED, Json(outcome)).into_response()
        }
        Err(PipelineError::SectionNotFound { section }) => {
            warn!(section = %section, "Section not found for snippet");
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": "section not found",
                    "section": section
                })),
            )
                .into_response()
        }
        Err(e @ PipelineError::PageCreation(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

// ── Dry run ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    text: String,
}

/// POST /api/classify: classification only, no side effects.
async fn classify(State(state): State<AppState>, Json(req): Json<ClassifyRequest>) -> Response {
    let classifier = state.pipeline.classifier();
    let routed = classifier.classify(&req.text);
    let rule = classifier.explain(&req.text);
    Json(serde_json::json!({
        "routed": routed,
        "rule": rule
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    name: String,
}

/// GET /api/sections/resolve?name=…
async fn resolve_section(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Response {
    let resolution = state.pipeline.resolver().resolve_traced(&query.name).await;
    match resolution.section_id() {
        Some(id) => Json(serde_json::json!({
            "name": query.name,
            "id": id,
            "via": resolution.via()
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "section not found",
                "name": query.name,
                "via": resolution.via()
            })),
        )
            .into_response(),
    }
}

/// GET /api/queue: pages waiting for their retry.
async fn list_queue(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pipeline.retries().pending().await)
}
