//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use vitals_core::insights::{Insight, InsightType};

/// Query parameters for listing insights
#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    /// Keep only insights of this type (e.g. "anomaly")
    #[serde(rename = "type")]
    pub insight_type: Option<String>,
    /// Maximum number of insights to return
    pub limit: Option<usize>,
}

/// GET /api/insights - Generated insights, most significant first
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let filter = params
        .insight_type
        .as_deref()
        .map(str::parse::<InsightType>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let insights = state.analytics.generate_insights().await;

    let insights: Vec<Insight> = insights
        .into_iter()
        .filter(|i| filter.map_or(true, |t| i.insight_type == t))
        .take(params.limit.unwrap_or(usize::MAX))
        .collect();

    Ok(Json(insights))
}
