//! Regional Aggregator
//!
//! Groups tobacco-use observations into five fixed US regions and compares
//! the highest and lowest regional averages.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Query;
use crate::normalize::{normalize, RecordFilter};
use crate::source::fetch_or_empty;
use crate::stats::mean;

use super::engine::{AnalysisContext, Analyzer};
use super::types::{Insight, InsightType, RegionalAverage, RegionalComparison};

const TOPIC: &str = "Tobacco";

/// Values a region needs to be compared
const MIN_VALUES: usize = 3;

/// Region membership; states outside the table are ignored
pub const REGIONS: &[(&str, &[&str])] = &[
    (
        "Northeast",
        &["CT", "ME", "MA", "NH", "RI", "VT", "NJ", "NY", "PA"],
    ),
    (
        "Southeast",
        &[
            "DE", "FL", "GA", "MD", "NC", "SC", "VA", "WV", "AL", "KY", "MS", "TN", "AR", "LA",
        ],
    ),
    (
        "Midwest",
        &["IL", "IN", "MI", "OH", "WI", "IA", "KS", "MN", "MO", "NE", "ND", "SD"],
    ),
    ("Southwest", &["AZ", "NM", "OK", "TX"]),
    (
        "West",
        &["CO", "ID", "MT", "NV", "UT", "WY", "AK", "CA", "HI", "OR", "WA"],
    ),
];

/// Region a state belongs to
pub fn region_for(state: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, states)| states.contains(&state))
        .map(|(region, _)| *region)
}

pub struct RegionalAnalyzer;

impl RegionalAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegionalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for RegionalAnalyzer {
    fn id(&self) -> &'static str {
        "regional"
    }

    fn name(&self) -> &'static str {
        "Regional Tobacco Use"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>> {
        let query = Query::new()
            .topic(TOPIC)
            .year(ctx.config.regional_year)
            .overall();
        let records = fetch_or_empty(ctx.source, &query, ctx.limit).await;

        let mut buckets: Vec<(&str, Vec<f64>)> =
            REGIONS.iter().map(|(region, _)| (*region, vec![])).collect();
        for obs in normalize(&records, &RecordFilter::new()) {
            if let Some(region) = region_for(&obs.state) {
                if let Some((_, values)) = buckets.iter_mut().find(|(r, _)| *r == region) {
                    values.push(obs.value);
                }
            }
        }

        let mut averages: Vec<RegionalAverage> = buckets
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_VALUES)
            .map(|(region, values)| RegionalAverage {
                region: region.to_string(),
                average: mean(&values),
                count: values.len(),
            })
            .collect();

        averages.sort_by(|a, b| b.average.total_cmp(&a.average));

        let (Some(highest), Some(lowest)) = (averages.first(), averages.last()) else {
            return Ok(vec![]);
        };

        let comparison = RegionalComparison {
            highest: highest.clone(),
            lowest: lowest.clone(),
            all: averages.clone(),
        };
        Ok(vec![regional_insight(&comparison)])
    }
}

fn regional_insight(comparison: &RegionalComparison) -> Insight {
    let RegionalComparison {
        highest, lowest, ..
    } = comparison;

    Insight::new(
        InsightType::Geographic,
        "Tobacco use varies significantly by region",
        format!(
            "The {} region has the highest average tobacco use ({:.1}%), while the {} has the \
             lowest ({:.1}%). This {:.1}% difference suggests regional cultural and policy \
             factors play a significant role.",
            highest.region,
            highest.average,
            lowest.region,
            lowest.average,
            (highest.average - lowest.average) / lowest.average * 100.0
        ),
        75.0,
        "Tobacco",
    )
    .with_data(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::models::Record;
    use crate::source::InMemorySource;
    use crate::test_utils::sample_record;

    const QUESTION: &str = "Current cigarette smoking among adults";

    fn row(state: &str, value: &str) -> Record {
        sample_record(state, state, 2021, TOPIC, QUESTION, value)
    }

    async fn run(records: Vec<Record>) -> Vec<Insight> {
        let source = InMemorySource::new(records);
        let config = AnalysisConfig::default();
        RegionalAnalyzer::new()
            .analyze(&AnalysisContext::new(&source, &config))
            .await
            .unwrap()
    }

    #[test]
    fn test_regions_partition_fifty_states() {
        let mut all: Vec<&str> = REGIONS.iter().flat_map(|(_, s)| s.iter().copied()).collect();
        assert_eq!(all.len(), 50);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 50);

        assert_eq!(region_for("TX"), Some("Southwest"));
        assert_eq!(region_for("DC"), None);
        assert_eq!(region_for("US"), None);
    }

    #[tokio::test]
    async fn test_highest_vs_lowest() {
        let records = vec![
            row("KY", "24.0"),
            row("WV", "26.0"),
            row("TN", "22.0"),
            row("CA", "9.0"),
            row("UT", "7.0"),
            row("WA", "11.0"),
            // Only two Midwest states: region excluded
            row("OH", "30.0"),
            row("MI", "30.0"),
            // Not in any region
            row("PR", "50.0"),
            row("DC", "1.0"),
        ];

        let insights = run(records).await;
        assert_eq!(insights.len(), 1);

        let insight = &insights[0];
        assert_eq!(insight.insight_type, InsightType::Geographic);
        assert_eq!(insight.significance, 75.0);
        assert_eq!(insight.data["highest"]["region"], "Southeast");
        assert_eq!(insight.data["highest"]["average"], 24.0);
        assert_eq!(insight.data["lowest"]["region"], "West");
        assert_eq!(insight.data["lowest"]["average"], 9.0);
        assert_eq!(insight.data["all"].as_array().unwrap().len(), 2);
        assert!(insight.description.contains("166.7% difference"));
    }

    #[tokio::test]
    async fn test_single_region_compares_with_itself() {
        let records = vec![row("AZ", "15.0"), row("NM", "16.0"), row("TX", "14.0")];
        let insights = run(records).await;
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].data["highest"], insights[0].data["lowest"]);
    }

    #[tokio::test]
    async fn test_no_qualifying_region() {
        let records = vec![row("AZ", "15.0"), row("NM", "16.0")];
        assert!(run(records).await.is_empty());
    }
}
