//! Trend Analyzer
//!
//! Fits a linear trend to each state's diabetes prevalence series and reports
//! the three fastest improvers (most negative slope) and the three fastest
//! decliners (most positive slope).

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Query;
use crate::normalize::{group_by_state, normalize, RecordFilter, StateSeries};
use crate::source::fetch_or_empty;
use crate::stats::linear_regression;

use super::engine::{AnalysisContext, Analyzer};
use super::types::{Insight, InsightType, TrendResult};

const TOPIC: &str = "Diabetes";
const QUESTION: &str = "Prevalence of diagnosed diabetes among adults aged >= 18 years";
const CATEGORY: &str = "Diabetes";

/// States reported on each end of the ranking
const TOP_N: usize = 3;

/// Minimum distinct years needed for a trend
const MIN_YEARS: usize = 3;

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for TrendAnalyzer {
    fn id(&self) -> &'static str {
        "trend"
    }

    fn name(&self) -> &'static str {
        "Diabetes Trends"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>> {
        let query = Query::new().topic(TOPIC).question(QUESTION).overall();
        let records = fetch_or_empty(ctx.source, &query, ctx.limit).await;

        let observations = normalize(&records, &RecordFilter::new().require_year());
        let mut trends: Vec<TrendResult> = group_by_state(&observations)
            .iter()
            .filter_map(compute_trend)
            .collect();

        trends.sort_by(|a, b| a.slope.total_cmp(&b.slope));

        let improvers = trends.iter().take(TOP_N);
        let decliners = trends.iter().rev().take(TOP_N);

        let mut insights: Vec<Insight> = improvers
            .enumerate()
            .map(|(i, t)| improvement_insight(t, 90.0 - 5.0 * i as f64))
            .collect();
        insights.extend(
            decliners
                .enumerate()
                .map(|(i, t)| concern_insight(t, 80.0 - 5.0 * i as f64)),
        );

        Ok(insights)
    }
}

/// Regress one state's series; `None` when it spans too few years
pub fn compute_trend(series: &StateSeries) -> Option<TrendResult> {
    if series.distinct_years() < MIN_YEARS {
        return None;
    }

    let points = series.sorted_by_year();
    let years: Vec<f64> = points.iter().map(|p| p.year as f64).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();

    let regression = linear_regression(&years, &values)?;
    let first = points.first()?;
    let last = points.last()?;

    Some(TrendResult {
        state: series.state.clone(),
        name: series.name.clone(),
        slope: regression.slope,
        intercept: regression.intercept,
        r_squared: regression.r_squared,
        percent_change: (last.value - first.value) / first.value * 100.0,
        start_value: first.value,
        end_value: last.value,
        year_range: format!("{}-{}", first.year, last.year),
    })
}

fn improvement_insight(trend: &TrendResult, significance: f64) -> Insight {
    Insight::new(
        InsightType::Improvement,
        format!("{} shows significant diabetes reduction", trend.name),
        format!(
            "{} has reduced diabetes prevalence by {:.1}% from {:.1}% to {:.1}% ({}). \
             This represents one of the strongest improvements nationally.",
            trend.name,
            trend.percent_change.abs(),
            trend.start_value,
            trend.end_value,
            trend.year_range
        ),
        significance,
        CATEGORY,
    )
    .with_data(trend)
}

fn concern_insight(trend: &TrendResult, significance: f64) -> Insight {
    Insight::new(
        InsightType::Concern,
        format!("{} shows rising diabetes prevalence", trend.name),
        format!(
            "{} has experienced a {:.1}% increase in diabetes prevalence from {:.1}% to {:.1}% ({}). \
             This trend warrants attention.",
            trend.name,
            trend.percent_change,
            trend.start_value,
            trend.end_value,
            trend.year_range
        ),
        significance,
        CATEGORY,
    )
    .with_data(trend)
}
