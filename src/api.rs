//! REST API Server for the obligation tracker
//!
//! Exposes extraction and scoring over HTTP for dashboards and other
//! rendering front ends.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::deadline::today;
use crate::models::Obligation;
use crate::tracker::ObligationTracker;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScoreRequest {
    pub obligations: Vec<Obligation>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub tracker: Arc<ObligationTracker>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Extraction Endpoint
/// =============================

async fn extract(
    State(state): State<ApiState>,
    Json(req): Json<ExtractRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Provide loan agreement text to extract from".into(),
            )),
        );
    }

    info!(chars = req.text.len(), "Received extraction request");

    let report = state.tracker.run(&req.text);

    (StatusCode::OK, Json(ApiResponse::success(report)))
}

/// =============================
/// Scoring Endpoint
/// =============================

async fn score(
    State(state): State<ApiState>,
    Json(req): Json<ScoreRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(count = req.obligations.len(), "Received scoring request");

    let today = today();
    let obligations = state.tracker.rescore(req.obligations, today);
    let summary = state.tracker.summarize(&obligations);

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "generated_on": today,
            "obligations": obligations,
            "summary": summary,
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(tracker: Arc<ObligationTracker>) -> Router {
    let state = ApiState { tracker };

    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/api/extract", post(extract))
        .route("/api/score", post(score))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    tracker: Arc<ObligationTracker>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(tracker);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
