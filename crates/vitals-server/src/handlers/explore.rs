//! Indicator exploration handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use vitals_core::models::{AGGREGATE_LOCATION, OVERALL};
use vitals_core::{Indicator, StateValue, TimeSeriesPoint};

#[derive(Debug, Deserialize)]
pub struct TimeSeriesQuery {
    pub topic: Option<String>,
    pub question: Option<String>,
    pub state: Option<String>,
    pub stratification: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComparisonQuery {
    pub topic: Option<String>,
    pub question: Option<String>,
    pub year: Option<i32>,
    pub stratification: Option<String>,
}

fn indicator(
    topic: Option<String>,
    question: Option<String>,
    stratification: Option<String>,
) -> Option<Indicator> {
    let topic = topic.filter(|t| !t.is_empty())?;
    let question = question.filter(|q| !q.is_empty())?;
    Some(
        Indicator::new(topic, question)
            .with_stratification(stratification.unwrap_or_else(|| OVERALL.to_string())),
    )
}

/// GET /api/timeseries - One location's values over time
pub async fn get_timeseries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeSeriesQuery>,
) -> Result<Json<Vec<TimeSeriesPoint>>, AppError> {
    let indicator = indicator(params.topic, params.question, params.stratification)
        .ok_or_else(|| AppError::bad_request("Topic and question are required"))?;
    let location = params
        .state
        .unwrap_or_else(|| AGGREGATE_LOCATION.to_string());

    let points = state
        .analytics
        .time_series(&indicator, &location)
        .await
        .map_err(|e| AppError::internal("Failed to fetch time series data", e))?;

    Ok(Json(points))
}

/// GET /api/state-comparison - All states for one indicator and year
pub async fn get_state_comparison(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ComparisonQuery>,
) -> Result<Json<Vec<StateValue>>, AppError> {
    let (Some(indicator), Some(year)) = (
        indicator(params.topic, params.question, params.stratification),
        params.year,
    ) else {
        return Err(AppError::bad_request(
            "Topic, question, and year are required",
        ));
    };

    let values = state
        .analytics
        .state_comparison(&indicator, year)
        .await
        .map_err(|e| AppError::internal("Failed to fetch state comparison data", e))?;

    Ok(Json(values))
}
