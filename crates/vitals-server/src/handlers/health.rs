//! Liveness handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use vitals_core::source::CacheStats;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// GET /health - Liveness probe with cache counters
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: state.analytics.source_name(),
        cache: state.analytics.cache_stats().await,
    })
}
