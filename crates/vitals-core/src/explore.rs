//! Exploration queries
//!
//! Thin views over one indicator: a single location's series over time and
//! all states compared for one year. Unlike the analyzers these propagate
//! fetch errors to the caller.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Query, AGGREGATE_LOCATION, OVERALL};
use crate::source::DataSource;

/// Row limit for exploration fetches
pub const EXPLORE_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub year: i32,
    pub value: f64,
    pub unit: Option<String>,
    #[serde(rename = "lowCI")]
    pub low_ci: Option<f64>,
    #[serde(rename = "highCI")]
    pub high_ci: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateValue {
    pub state: String,
    pub state_name: Option<String>,
    pub value: f64,
    pub unit: Option<String>,
}

/// Parameters identifying one indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub topic: String,
    pub question: String,
    pub stratification: String,
}

impl Indicator {
    pub fn new(topic: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            question: question.into(),
            stratification: OVERALL.to_string(),
        }
    }

    pub fn with_stratification(mut self, stratification: impl Into<String>) -> Self {
        self.stratification = stratification.into();
        self
    }

    fn query(&self) -> Query {
        Query::new()
            .topic(&self.topic)
            .question(&self.question)
            .stratification(&self.stratification)
    }
}

/// One location's values over time, oldest first
pub async fn time_series(
    source: &dyn DataSource,
    indicator: &Indicator,
    state: &str,
) -> Result<Vec<TimeSeriesPoint>> {
    let query = indicator.query().location(state);
    let records = source.fetch(&query, EXPLORE_LIMIT).await?;

    let mut points: Vec<TimeSeriesPoint> = records
        .iter()
        .filter_map(|r| {
            Some(TimeSeriesPoint {
                year: r.year()?,
                value: r.value()?,
                unit: r.datavalueunit.clone(),
                low_ci: r.low_ci(),
                high_ci: r.high_ci(),
            })
        })
        .collect();

    points.sort_by_key(|p| p.year);
    Ok(points)
}

/// Every state's value for one year, highest first
pub async fn state_comparison(
    source: &dyn DataSource,
    indicator: &Indicator,
    year: i32,
) -> Result<Vec<StateValue>> {
    let query = indicator.query().year(year);
    let records = source.fetch(&query, EXPLORE_LIMIT).await?;

    let mut values: Vec<StateValue> = records
        .iter()
        .filter_map(|r| {
            let state = r.location()?;
            if state == AGGREGATE_LOCATION {
                return None;
            }
            Some(StateValue {
                state: state.to_string(),
                state_name: r.locationdesc.clone(),
                value: r.value()?,
                unit: r.datavalueunit.clone(),
            })
        })
        .collect();

    values.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::source::InMemorySource;
    use crate::test_utils::sample_record;

    const TOPIC: &str = "Diabetes";
    const QUESTION: &str = "Prevalence of diagnosed diabetes";

    fn row(state: &str, year: i32, value: &str) -> Record {
        let mut r = sample_record(state, state, year, TOPIC, QUESTION, value);
        r.datavalueunit = Some("%".into());
        r.lowconfidencelimit = Some("1.0".into());
        r
    }

    #[tokio::test]
    async fn test_time_series_sorted() {
        let source = InMemorySource::new(vec![
            row("US", 2021, "11.0"),
            row("US", 2019, "10.0"),
            row("US", 2020, ""),
            row("OH", 2020, "12.0"),
        ]);

        let points = time_series(&source, &Indicator::new(TOPIC, QUESTION), "US")
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].year, 2019);
        assert_eq!(points[1].value, 11.0);
        assert_eq!(points[0].unit.as_deref(), Some("%"));
        assert_eq!(points[0].low_ci, Some(1.0));
        assert_eq!(points[0].high_ci, None);
    }

    #[tokio::test]
    async fn test_state_comparison_excludes_aggregate() {
        let source = InMemorySource::new(vec![
            row("US", 2021, "11.0"),
            row("OH", 2021, "12.0"),
            row("WV", 2021, "15.5"),
            row("CO", 2021, "7.0"),
            row("CO", 2020, "99.0"),
        ]);

        let values = state_comparison(&source, &Indicator::new(TOPIC, QUESTION), 2021)
            .await
            .unwrap();

        let order: Vec<&str> = values.iter().map(|v| v.state.as_str()).collect();
        assert_eq!(order, vec!["WV", "OH", "CO"]);
    }

    #[tokio::test]
    async fn test_stratification_filter() {
        let mut female = row("OH", 2021, "9.0");
        female.stratification1 = Some("Female".into());
        let source = InMemorySource::new(vec![female, row("OH", 2021, "12.0")]);

        let indicator = Indicator::new(TOPIC, QUESTION).with_stratification("Female");
        let values = state_comparison(&source, &indicator, 2021).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, 9.0);
    }
}
