//! Anomaly Detector
//!
//! Flags states whose mean cancer mortality is more than two standard
//! deviations from the cross-state distribution of means.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Query;
use crate::normalize::{group_by_state, normalize, with_min_points, RecordFilter};
use crate::source::fetch_or_empty;
use crate::stats::{mean, std_dev};

use super::engine::{AnalysisContext, Analyzer};
use super::types::{Insight, InsightType, StateAnomaly};

const TOPIC: &str = "Cancer";
const DATASOURCE: &str = "NVSS";

/// Observations a state needs to be included
const MIN_VALUES: usize = 3;
/// |z| above this is reported
const Z_THRESHOLD: f64 = 2.0;

pub struct AnomalyAnalyzer;

impl AnomalyAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnomalyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for AnomalyAnalyzer {
    fn id(&self) -> &'static str {
        "anomaly"
    }

    fn name(&self) -> &'static str {
        "Cancer Mortality Anomalies"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>> {
        let query = Query::new().topic(TOPIC).datasource(DATASOURCE).overall();
        let records = fetch_or_empty(ctx.source, &query, ctx.limit).await;

        let filter = RecordFilter::new().min_year(ctx.config.anomaly_min_year);
        let series = with_min_points(group_by_state(&normalize(&records, &filter)), MIN_VALUES);

        let stats: Vec<(String, String, f64, f64)> = series
            .iter()
            .map(|s| {
                let values = s.values();
                (s.state.clone(), s.name.clone(), mean(&values), std_dev(&values))
            })
            .collect();

        Ok(detect(&stats).iter().map(anomaly_insight).collect())
    }
}

/// Score `(state, name, mean, std_dev)` rows against the mean of means
fn detect(stats: &[(String, String, f64, f64)]) -> Vec<StateAnomaly> {
    let means: Vec<f64> = stats.iter().map(|(_, _, m, _)| *m).collect();
    let overall_mean = mean(&means);
    let overall_sd = std_dev(&means);

    if !(overall_sd.is_finite() && overall_sd > 0.0) {
        return vec![];
    }

    stats
        .iter()
        .filter_map(|(state, name, value, sd)| {
            let z_score = (value - overall_mean) / overall_sd;
            (z_score.abs() > Z_THRESHOLD).then(|| StateAnomaly {
                state: state.clone(),
                name: name.clone(),
                value: *value,
                std_dev: *sd,
                national_avg: overall_mean,
                z_score,
                deviation: (value - overall_mean) / overall_mean * 100.0,
            })
        })
        .collect()
}

fn anomaly_insight(anomaly: &StateAnomaly) -> Insight {
    let elevated = anomaly.z_score > 0.0;

    Insight::new(
        InsightType::Anomaly,
        format!(
            "{} has {} cancer mortality",
            anomaly.name,
            if elevated { "elevated" } else { "notably low" }
        ),
        format!(
            "{}'s cancer mortality rate ({:.1} per 100,000) is {:.1} standard deviations {} the \
             national average. This statistical anomaly warrants further investigation.",
            anomaly.name,
            anomaly.value,
            anomaly.z_score.abs(),
            if elevated { "above" } else { "below" }
        ),
        (60.0 + anomaly.z_score.abs() * 10.0).min(95.0),
        "Cancer",
    )
    .with_data(anomaly)
}
