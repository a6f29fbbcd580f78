//! Composite health scoring
//!
//! A state's score starts at 100. Up to six indicators adjust it: five
//! burdens subtract in proportion to their value, physical activity adds.
//! Indicators are recognized from question text with an ordered rule table
//! where the first matching rule wins.

use serde::{Deserialize, Serialize};

use crate::models::{Query, Record};
use crate::source::DataSource;

/// Indicators that feed the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    Diabetes,
    Obesity,
    Smoking,
    Cancer,
    Cvd,
    Exercise,
}

impl HealthMetric {
    /// Classification order; earlier rules take precedence
    pub const ALL: [HealthMetric; 6] = [
        HealthMetric::Diabetes,
        HealthMetric::Obesity,
        HealthMetric::Smoking,
        HealthMetric::Cancer,
        HealthMetric::Cvd,
        HealthMetric::Exercise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthMetric::Diabetes => "diabetes",
            HealthMetric::Obesity => "obesity",
            HealthMetric::Smoking => "smoking",
            HealthMetric::Cancer => "cancer",
            HealthMetric::Cvd => "cvd",
            HealthMetric::Exercise => "exercise",
        }
    }

    /// Whether a lowercased question text describes this metric
    fn matches(&self, question: &str) -> bool {
        match self {
            HealthMetric::Diabetes => question.contains("diabetes") && question.contains("prevalence"),
            HealthMetric::Obesity => question.contains("obesity"),
            HealthMetric::Smoking => question.contains("smoking") || question.contains("tobacco"),
            HealthMetric::Cancer => question.contains("cancer") && question.contains("mortality"),
            HealthMetric::Cvd => {
                question.contains("cardiovascular") && question.contains("mortality")
            }
            HealthMetric::Exercise => question.contains("physical activity"),
        }
    }

    /// Classify a question (case-insensitive)
    pub fn classify(question: &str) -> Option<HealthMetric> {
        let question = question.to_lowercase();
        Self::ALL.into_iter().find(|m| m.matches(&question))
    }

    /// Score adjustment for a value of this metric
    pub fn impact(&self, value: f64) -> f64 {
        match self {
            HealthMetric::Diabetes => -(value / 20.0) * 15.0,
            HealthMetric::Obesity => -(value / 40.0) * 20.0,
            HealthMetric::Smoking => -(value / 30.0) * 15.0,
            HealthMetric::Cancer => -(value / 200.0) * 20.0,
            HealthMetric::Cvd => -(value / 300.0) * 20.0,
            HealthMetric::Exercise => (value / 100.0) * 10.0,
        }
    }
}

/// Latest value seen for each metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub diabetes: Option<f64>,
    pub obesity: Option<f64>,
    pub smoking: Option<f64>,
    pub cancer: Option<f64>,
    pub cvd: Option<f64>,
    pub exercise: Option<f64>,
}

impl HealthMetrics {
    pub fn get(&self, metric: HealthMetric) -> Option<f64> {
        match metric {
            HealthMetric::Diabetes => self.diabetes,
            HealthMetric::Obesity => self.obesity,
            HealthMetric::Smoking => self.smoking,
            HealthMetric::Cancer => self.cancer,
            HealthMetric::Cvd => self.cvd,
            HealthMetric::Exercise => self.exercise,
        }
    }

    pub fn set(&mut self, metric: HealthMetric, value: f64) {
        let slot = match metric {
            HealthMetric::Diabetes => &mut self.diabetes,
            HealthMetric::Obesity => &mut self.obesity,
            HealthMetric::Smoking => &mut self.smoking,
            HealthMetric::Cancer => &mut self.cancer,
            HealthMetric::Cvd => &mut self.cvd,
            HealthMetric::Exercise => &mut self.exercise,
        };
        *slot = Some(value);
    }

    /// Number of metrics present
    pub fn count(&self) -> usize {
        HealthMetric::ALL
            .iter()
            .filter(|m| self.get(**m).is_some())
            .count()
    }

    /// Classify records into metrics; later records overwrite earlier ones
    pub fn from_records(records: &[Record]) -> Self {
        let mut metrics = Self::default();
        for record in records {
            let Some(value) = record.value() else {
                continue;
            };
            if let Some(metric) = HealthMetric::classify(record.question_text()) {
                metrics.set(metric, value);
            }
        }
        metrics
    }

    /// Composite score in [0, 100]
    pub fn score(&self) -> f64 {
        let raw = HealthMetric::ALL
            .iter()
            .filter_map(|m| self.get(*m).map(|v| m.impact(v)))
            .fold(100.0, |score, delta| score + delta);
        raw.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreResult {
    pub state: String,
    pub name: Option<String>,
    pub score: f64,
    pub metrics: HealthMetrics,
    pub components_count: usize,
    pub year: i32,
}

/// Score one state-year from its records
pub fn score_records(state: &str, year: i32, records: &[Record]) -> HealthScoreResult {
    let metrics = HealthMetrics::from_records(records);
    let name = records
        .iter()
        .find(|r| r.location() == Some(state))
        .and_then(|r| r.locationdesc.clone());

    HealthScoreResult {
        state: state.to_string(),
        name,
        score: metrics.score(),
        components_count: metrics.count(),
        metrics,
        year,
    }
}

/// Fetch and score one state-year
///
/// Returns `None` only when the fetch fails; a state with no usable data
/// scores 100 with zero components.
pub async fn calculate_health_score(
    source: &dyn DataSource,
    state: &str,
    year: i32,
    limit: usize,
) -> Option<HealthScoreResult> {
    let query = Query::new().location(state).year(year).overall();
    match source.fetch(&query, limit).await {
        Ok(records) => {
            let result = score_records(state, year, &records);
            tracing::debug!(
                state,
                year,
                score = result.score,
                components = result.components_count,
                "Scored state"
            );
            Some(result)
        }
        Err(e) => {
            tracing::warn!(state, year, error = %e, "Health score fetch failed");
            None
        }
    }
}
