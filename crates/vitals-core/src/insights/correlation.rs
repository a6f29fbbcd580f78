//! Correlation Analyzer
//!
//! Joins obesity, diabetes and cardiovascular indicators by state for a single
//! year, then runs two independent checks:
//! - Pearson correlation between obesity and diabetes across states
//! - States whose diabetes/obesity ratio sits more than 1.5 standard
//!   deviations from the average ratio

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Query, Record};
use crate::normalize::{normalize, RecordFilter};
use crate::source::fetch_or_empty;
use crate::stats::{correlation, mean, std_dev};

use super::engine::{AnalysisContext, Analyzer};
use super::types::{CorrelationData, Insight, InsightType, RatioOutlier};

const OBESITY_TOPIC: &str = "Nutrition, Physical Activity, and Weight Status";
const DIABETES_TOPIC: &str = "Diabetes";
const CVD_TOPIC: &str = "Cardiovascular Disease";

/// Correlation needs more than this many states
const MIN_SAMPLE: usize = 10;
/// Minimum |r| worth reporting
const MIN_CORRELATION: f64 = 0.5;
/// Ratio outlier threshold, in standard deviations
const RATIO_THRESHOLD: f64 = 1.5;

/// Indicator values for one state
#[derive(Debug, Clone, PartialEq)]
pub struct StateIndicators {
    pub state: String,
    pub name: String,
    pub obesity: Option<f64>,
    pub diabetes: Option<f64>,
    pub cardiovascular: Option<f64>,
}

pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for CorrelationAnalyzer {
    fn id(&self) -> &'static str {
        "correlation"
    }

    fn name(&self) -> &'static str {
        "Cross-Indicator Correlation"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>> {
        let year = ctx.config.correlation_year;
        let query = |topic: &str| Query::new().topic(topic).year(year).overall();

        let (obesity_q, diabetes_q, cvd_q) =
            (query(OBESITY_TOPIC), query(DIABETES_TOPIC), query(CVD_TOPIC));
        let (obesity, diabetes, cvd) = futures::join!(
            fetch_or_empty(ctx.source, &obesity_q, ctx.limit),
            fetch_or_empty(ctx.source, &diabetes_q, ctx.limit),
            fetch_or_empty(ctx.source, &cvd_q, ctx.limit),
        );

        let states = merge_indicators(&obesity, &diabetes, &cvd);
        let paired: Vec<&StateIndicators> = states
            .iter()
            .filter(|s| s.obesity.is_some() && s.diabetes.is_some())
            .collect();

        let mut insights = Vec::new();
        insights.extend(correlation_insight(&paired, year));
        insights.extend(ratio_outliers(&paired).iter().map(ratio_insight));

        Ok(insights)
    }
}

/// Merge the three indicator batches by state
///
/// State entries come from the obesity batch; diabetes and cardiovascular
/// values only attach to states already present. Later rows overwrite
/// earlier ones.
pub fn merge_indicators(
    obesity: &[Record],
    diabetes: &[Record],
    cvd: &[Record],
) -> Vec<StateIndicators> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut states: Vec<StateIndicators> = Vec::new();

    for obs in normalize(obesity, &RecordFilter::new().question_contains("Obesity")) {
        let slot = *index.entry(obs.state.clone()).or_insert_with(|| {
            states.push(StateIndicators {
                state: obs.state.clone(),
                name: obs.name.clone(),
                obesity: None,
                diabetes: None,
                cardiovascular: None,
            });
            states.len() - 1
        });
        states[slot].obesity = Some(obs.value);
    }

    let diabetes_filter = RecordFilter::new().question_contains("diagnosed diabetes");
    for obs in normalize(diabetes, &diabetes_filter) {
        if let Some(&slot) = index.get(&obs.state) {
            states[slot].diabetes = Some(obs.value);
        }
    }

    let cvd_filter = RecordFilter::new().question_contains("cardiovascular disease");
    for obs in normalize(cvd, &cvd_filter) {
        if let Some(&slot) = index.get(&obs.state) {
            states[slot].cardiovascular = Some(obs.value);
        }
    }

    states
}

fn correlation_insight(paired: &[&StateIndicators], year: i32) -> Option<Insight> {
    if paired.len() <= MIN_SAMPLE {
        return None;
    }

    let obesity: Vec<f64> = paired.iter().filter_map(|s| s.obesity).collect();
    let diabetes: Vec<f64> = paired.iter().filter_map(|s| s.diabetes).collect();
    let r = correlation(&obesity, &diabetes)?;
    if r.abs() <= MIN_CORRELATION {
        return None;
    }

    let relationship = if r > 0.0 { "positive" } else { "negative" };
    let data = CorrelationData {
        correlation: r,
        year,
        sample_size: paired.len(),
        relationship: relationship.to_string(),
    };

    // The (n-1) correlation sum can exceed 1 in magnitude, and so can this.
    let significance = r.abs() * 100.0;

    Some(
        Insight::new(
            InsightType::Correlation,
            "Strong correlation between obesity and diabetes",
            format!(
                "Statistical analysis reveals a {} correlation of {:.3} between obesity and \
                 diabetes rates across states ({}). States with higher obesity rates tend to \
                 have proportionally higher diabetes prevalence.",
                relationship, r, year
            ),
            significance,
            "Cross-Indicator Analysis",
        )
        .with_data(&data),
    )
}

/// States whose diabetes/obesity ratio is unusually high or low, highest first
pub fn ratio_outliers(paired: &[&StateIndicators]) -> Vec<RatioOutlier> {
    let rows: Vec<(&StateIndicators, f64, f64, f64)> = paired
        .iter()
        .filter_map(|s| {
            let (obesity, diabetes) = (s.obesity?, s.diabetes?);
            Some((*s, obesity, diabetes, diabetes / obesity))
        })
        .collect();

    let ratios: Vec<f64> = rows.iter().map(|(_, _, _, r)| *r).collect();
    let avg = mean(&ratios);
    let sd = std_dev(&ratios);

    let mut outliers: Vec<RatioOutlier> = rows
        .into_iter()
        .filter(|(_, _, _, ratio)| (ratio - avg).abs() > RATIO_THRESHOLD * sd)
        .map(|(s, obesity, diabetes, ratio)| RatioOutlier {
            state: s.state.clone(),
            name: s.name.clone(),
            ratio,
            average_ratio: avg,
            obesity,
            diabetes,
            cardiovascular: s.cardiovascular,
        })
        .collect();

    outliers.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    outliers
}

fn ratio_insight(outlier: &RatioOutlier) -> Insight {
    let diff = (outlier.ratio - outlier.average_ratio) / outlier.average_ratio * 100.0;
    let direction = if outlier.ratio > outlier.average_ratio {
        "higher"
    } else {
        "lower"
    };

    Insight::new(
        InsightType::Anomaly,
        format!("{} shows unusual diabetes-to-obesity ratio", outlier.name),
        format!(
            "{} has a diabetes-to-obesity ratio of {:.2}, which is {:.1}% {} than the national \
             average. This suggests other factors beyond obesity may be influencing diabetes rates.",
            outlier.name, outlier.ratio, diff, direction
        ),
        70.0,
        "Statistical Anomalies",
    )
    .with_data(outlier)
}
