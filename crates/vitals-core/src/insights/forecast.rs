//! Forecaster
//!
//! Extends the national cardiovascular mortality trend to a target year.
//! R² of the fit doubles as the confidence of the forecast.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Query, SeriesPoint, AGGREGATE_LOCATION};
use crate::normalize::{normalize, RecordFilter};
use crate::source::fetch_or_empty;
use crate::stats::linear_regression;

use super::engine::{AnalysisContext, Analyzer};
use super::types::{ForecastData, Insight, InsightType};

const TOPIC: &str = "Cardiovascular Disease";
const DATASOURCE: &str = "NVSS";
const QUESTION_MATCH: &str = "Mortality";

/// Points needed before a forecast is attempted
const MIN_POINTS: usize = 5;

pub struct ForecastAnalyzer;

impl ForecastAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ForecastAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for ForecastAnalyzer {
    fn id(&self) -> &'static str {
        "forecast"
    }

    fn name(&self) -> &'static str {
        "Cardiovascular Mortality Forecast"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>> {
        let query = Query::new()
            .topic(TOPIC)
            .location(AGGREGATE_LOCATION)
            .datasource(DATASOURCE)
            .overall();
        let records = fetch_or_empty(ctx.source, &query, ctx.limit).await;

        let filter = RecordFilter::new()
            .question_contains(QUESTION_MATCH)
            .min_year(ctx.config.forecast_min_year)
            .include_aggregate();

        let mut points: Vec<SeriesPoint> = normalize(&records, &filter)
            .into_iter()
            .filter_map(|o| {
                Some(SeriesPoint {
                    year: o.year?,
                    value: o.value,
                })
            })
            .collect();
        points.sort_by_key(|p| p.year);

        Ok(forecast(&points, ctx.config.forecast_target_year)
            .map(|data| vec![forecast_insight(&data)])
            .unwrap_or_default())
    }
}

/// Fit a line through year-sorted points and extrapolate to `target_year`
pub fn forecast(points: &[SeriesPoint], target_year: i32) -> Option<ForecastData> {
    if points.len() < MIN_POINTS {
        return None;
    }

    let years: Vec<f64> = points.iter().map(|p| p.year as f64).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let regression = linear_regression(&years, &values)?;

    let first = points.first()?;
    let last = points.last()?;
    let prediction = regression.predict(target_year as f64);
    let change = prediction - last.value;

    Some(ForecastData {
        target_year,
        prediction,
        current: last.value,
        change,
        percent_change: change / last.value * 100.0,
        r_squared: regression.r_squared,
        trend: if regression.slope < 0.0 {
            "declining"
        } else {
            "increasing"
        }
        .to_string(),
        year_range: format!("{}-{}", first.year, last.year),
    })
}

fn forecast_insight(data: &ForecastData) -> Insight {
    Insight::new(
        InsightType::Prediction,
        format!(
            "Cardiovascular disease mortality forecast for {}",
            data.target_year
        ),
        format!(
            "Based on trends from {}, cardiovascular disease mortality is projected to {} to \
             {:.1} per 100,000 by {} (currently {:.1}). Model confidence: {:.0}%.",
            data.year_range,
            if data.change < 0.0 { "decrease" } else { "increase" },
            data.prediction,
            data.target_year,
            data.current,
            data.r_squared * 100.0
        ),
        data.r_squared * 80.0,
        "Cardiovascular Disease",
    )
    .with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::models::Record;
    use crate::source::InMemorySource;
    use crate::test_utils::sample_record;

    const QUESTION: &str = "Mortality from heart disease";

    fn national(year: i32, question: &str, value: &str) -> Record {
        let mut r = sample_record("US", "United States", year, TOPIC, question, value);
        r.datasource = Some(DATASOURCE.to_string());
        r
    }

    async fn run(records: Vec<Record>) -> Vec<Insight> {
        let source = InMemorySource::new(records);
        let config = AnalysisConfig::default();
        ForecastAnalyzer::new()
            .analyze(&AnalysisContext::new(&source, &config))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_declining_forecast() {
        // 200 in 2015 falling 2 per year
        let mut records: Vec<Record> = (2015..=2020)
            .rev()
            .map(|y| national(y, QUESTION, &(200 - 2 * (y - 2015)).to_string()))
            .collect();
        // Ignored: before the year floor, wrong question, state-level row
        records.push(national(2005, QUESTION, "900"));
        records.push(national(2016, "Hospitalization for heart failure", "900"));
        let mut state_row = national(2017, QUESTION, "900");
        state_row.locationabbr = Some("OH".into());
        records.push(state_row);

        let insights = run(records).await;
        assert_eq!(insights.len(), 1);

        let insight = &insights[0];
        assert_eq!(insight.insight_type, InsightType::Prediction);
        assert_eq!(insight.title, "Cardiovascular disease mortality forecast for 2025");
        assert!((insight.significance - 80.0).abs() < 1e-9);
        assert!(insight.description.contains("decrease to 180.0"));
        assert!(insight.description.contains("2015-2020"));

        let prediction = insight.data["prediction"].as_f64().unwrap();
        assert!((prediction - 180.0).abs() < 1e-6);
        assert_eq!(insight.data["current"], 190.0);
        assert_eq!(insight.data["trend"], "declining");
    }

    #[tokio::test]
    async fn test_too_few_points() {
        let records: Vec<Record> = (2016..=2019)
            .map(|y| national(y, QUESTION, "100"))
            .collect();
        assert!(run(records).await.is_empty());
    }

    #[test]
    fn test_increase_direction() {
        let points: Vec<SeriesPoint> = (0..5)
            .map(|i| SeriesPoint {
                year: 2018 + i,
                value: 100.0 + i as f64,
            })
            .collect();
        let data = forecast(&points, 2025).unwrap();
        assert!((data.prediction - 107.0).abs() < 1e-6);
        assert!(data.change > 0.0);

        let insight = forecast_insight(&data);
        assert!(insight.description.contains("increase to 107.0"));
    }
}
