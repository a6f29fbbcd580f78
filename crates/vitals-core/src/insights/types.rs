//! Core types for the insight engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of findings the analyzers emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// A state whose indicator is trending in the right direction
    Improvement,
    /// A state whose indicator is trending in the wrong direction
    Concern,
    /// Two indicators moving together across states
    Correlation,
    /// A state far from the cross-state distribution
    Anomaly,
    /// Differences between regions
    Geographic,
    /// Extrapolated future value
    Prediction,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Improvement => "improvement",
            InsightType::Concern => "concern",
            InsightType::Correlation => "correlation",
            InsightType::Anomaly => "anomaly",
            InsightType::Geographic => "geographic",
            InsightType::Prediction => "prediction",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improvement" => Ok(InsightType::Improvement),
            "concern" => Ok(InsightType::Concern),
            "correlation" => Ok(InsightType::Correlation),
            "anomaly" => Ok(InsightType::Anomaly),
            "geographic" => Ok(InsightType::Geographic),
            "prediction" => Ok(InsightType::Prediction),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// A scored, human-readable finding
///
/// `significance` orders insights within one analyzer's output. Values from
/// different analyzers use different scales and are only merged for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub significance: f64,
    pub category: String,
    /// The analyzer result this insight was derived from
    pub data: serde_json::Value,
}

impl Insight {
    pub fn new(
        insight_type: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        significance: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            insight_type,
            title: title.into(),
            description: description.into(),
            significance,
            category: category.into(),
            data: serde_json::Value::Null,
        }
    }

    /// Attach the originating result
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).unwrap_or_default();
        self
    }
}

/// Linear trend of one state's series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub state: String,
    pub name: String,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// (last - first) / first * 100
    pub percent_change: f64,
    pub start_value: f64,
    pub end_value: f64,
    /// "YYYY-YYYY"
    pub year_range: String,
}

/// Cross-state correlation between obesity and diabetes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationData {
    pub correlation: f64,
    pub year: i32,
    pub sample_size: usize,
    pub relationship: String,
}

/// A state whose diabetes/obesity ratio sits far from the average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioOutlier {
    pub state: String,
    pub name: String,
    pub ratio: f64,
    pub average_ratio: f64,
    pub obesity: f64,
    pub diabetes: f64,
    pub cardiovascular: Option<f64>,
}

/// A state whose mean sits far from the mean of all states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAnomaly {
    pub state: String,
    pub name: String,
    /// Mean of the state's observations
    pub value: f64,
    /// Population standard deviation of the state's observations
    pub std_dev: f64,
    pub national_avg: f64,
    pub z_score: f64,
    /// Percent difference from the national average
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAverage {
    pub region: String,
    pub average: f64,
    pub count: usize,
}

/// Highest vs lowest region, plus every qualifying region (sorted descending)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalComparison {
    pub highest: RegionalAverage,
    pub lowest: RegionalAverage,
    pub all: Vec<RegionalAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastData {
    pub target_year: i32,
    pub prediction: f64,
    pub current: f64,
    pub change: f64,
    pub percent_change: f64,
    pub r_squared: f64,
    /// "declining" or "increasing"
    pub trend: String,
    pub year_range: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_type_roundtrip() {
        for t in [
            InsightType::Improvement,
            InsightType::Concern,
            InsightType::Correlation,
            InsightType::Anomaly,
            InsightType::Geographic,
            InsightType::Prediction,
        ] {
            assert_eq!(t.as_str().parse::<InsightType>().unwrap(), t);
        }
        assert!("trend".parse::<InsightType>().is_err());
    }

    #[test]
    fn test_insight_serializes_type_field() {
        let insight = Insight::new(
            InsightType::Geographic,
            "Tobacco use varies",
            "desc",
            75.0,
            "Tobacco",
        )
        .with_data(&RegionalAverage {
            region: "West".into(),
            average: 12.0,
            count: 4,
        });

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "geographic");
        assert_eq!(json["significance"], 75.0);
        assert_eq!(json["data"]["region"], "West");
    }
}
