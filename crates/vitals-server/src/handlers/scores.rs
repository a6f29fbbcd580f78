//! Health score and ranking handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use vitals_core::{HealthScoreResult, DEFAULT_YEAR};

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// GET /api/health-rankings - States ranked by composite score
pub async fn get_health_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<YearQuery>,
) -> Json<Vec<HealthScoreResult>> {
    let year = params.year.unwrap_or(DEFAULT_YEAR);
    Json(state.analytics.get_health_rankings(year).await)
}

/// GET /api/health-score/:state - Composite score for one state
pub async fn get_health_score(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(params): Query<YearQuery>,
) -> Result<Json<HealthScoreResult>, AppError> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::bad_request("State must be a two-letter code"));
    }

    let year = params.year.unwrap_or(DEFAULT_YEAR);
    state
        .analytics
        .calculate_health_score(&code, year)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("State not found or insufficient data"))
}
