//! Multi-state health rankings
//!
//! Discovers state codes from a sample of one year's rows, scores a bounded
//! number of them and keeps those with enough components to compare.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};

use crate::config::RankingsConfig;
use crate::models::{Query, Record, AGGREGATE_LOCATION};
use crate::scoring::{calculate_health_score, HealthScoreResult};
use crate::source::DataSource;

/// Distinct two-letter state codes (and names) in discovery order
pub fn discover_states(records: &[Record]) -> Vec<(String, Option<String>)> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| {
            let code = r.location()?;
            (code.len() == 2 && code != AGGREGATE_LOCATION && seen.insert(code.to_string()))
                .then(|| (code.to_string(), r.locationdesc.clone()))
        })
        .collect()
}

/// Rank states for `year` by composite health score, best first
///
/// A state whose scoring fetch fails is left out. A failed sample fetch
/// yields an empty ranking.
pub async fn get_health_rankings(
    source: &dyn DataSource,
    year: i32,
    config: &RankingsConfig,
    score_limit: usize,
) -> Vec<HealthScoreResult> {
    let sample_query = Query::new().year(year);
    let sample = match source.fetch(&sample_query, config.sample_limit).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(year, error = %e, "Failed to fetch state sample");
            return vec![];
        }
    };

    let states = discover_states(&sample);
    let total = states.len();

    let scored: Vec<Option<HealthScoreResult>> = stream::iter(
        states.into_iter().take(config.max_states),
    )
    .map(|(code, name)| async move {
        calculate_health_score(source, &code, year, score_limit)
            .await
            .map(|mut result| {
                if result.name.is_none() {
                    result.name = name;
                }
                result
            })
    })
    .buffered(config.concurrency.max(1))
    .collect()
    .await;

    let mut rankings: Vec<HealthScoreResult> = scored
        .into_iter()
        .flatten()
        .filter(|r| r.components_count >= config.min_components)
        .collect();

    rankings.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::info!(
        year,
        discovered = total,
        ranked = rankings.len(),
        "Computed health rankings"
    );
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::source::InMemorySource;
    use crate::test_utils::sample_record;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const DIABETES: &str = "Prevalence of diagnosed diabetes";
    const OBESITY: &str = "Obesity among adults";
    const SMOKING: &str = "Current smoking";

    fn state_rows(code: &str, diabetes: &str) -> Vec<Record> {
        vec![
            sample_record(code, code, 2021, "Mixed", DIABETES, diabetes),
            sample_record(code, code, 2021, "Mixed", OBESITY, "20"),
            sample_record(code, code, 2021, "Mixed", SMOKING, "15"),
        ]
    }

    /// Records which states were scored and optionally fails some of them
    struct Recording {
        inner: InMemorySource,
        scored: Mutex<Vec<String>>,
        fail_states: Vec<&'static str>,
        fail_sample: bool,
    }

    impl Recording {
        fn new(records: Vec<Record>) -> Self {
            Self {
                inner: InMemorySource::new(records),
                scored: Mutex::new(vec![]),
                fail_states: vec![],
                fail_sample: false,
            }
        }
    }

    #[async_trait]
    impl DataSource for Recording {
        async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
            match query.get("locationabbr") {
                Some(state) => {
                    self.scored.lock().unwrap().push(state.to_string());
                    if self.fail_states.iter().any(|s| *s == state) {
                        return Err(Error::Upstream {
                            status: 500,
                            message: "boom".into(),
                        });
                    }
                }
                None if self.fail_sample => {
                    return Err(Error::Upstream {
                        status: 503,
                        message: "unavailable".into(),
                    });
                }
                None => {}
            }
            self.inner.fetch(query, limit).await
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn code(i: usize) -> String {
        format!(
            "{}{}",
            (b'A' + (i / 26) as u8) as char,
            (b'A' + (i % 26) as u8) as char
        )
    }

    #[tokio::test]
    async fn test_only_first_thirty_scored() {
        let records: Vec<Record> = (0..35).flat_map(|i| state_rows(&code(i), "10")).collect();
        let source = Recording::new(records);

        let rankings =
            get_health_rankings(&source, 2021, &RankingsConfig::default(), 1000).await;

        let scored = source.scored.lock().unwrap().clone();
        let expected: Vec<String> = (0..30).map(code).collect();
        assert_eq!(scored.len(), 30);
        let mut sorted = scored.clone();
        sorted.sort();
        assert_eq!(sorted, expected);
        assert_eq!(rankings.len(), 30);
    }

    #[tokio::test]
    async fn test_sorted_and_filtered() {
        let mut records = state_rows("AA", "10");
        records.extend(state_rows("BB", "2"));
        records.extend(state_rows("CC", "18"));
        // Only two components: excluded
        records.push(sample_record("DD", "DD", 2021, "Mixed", DIABETES, "5"));
        records.push(sample_record("DD", "DD", 2021, "Mixed", OBESITY, "5"));
        // Aggregate and non-state codes are not ranked
        records.extend(state_rows("US", "1"));
        records.extend(state_rows("USA", "1"));

        let source = Recording::new(records);
        let rankings =
            get_health_rankings(&source, 2021, &RankingsConfig::default(), 1000).await;

        let order: Vec<&str> = rankings.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(order, vec!["BB", "AA", "CC"]);
        assert!(rankings.iter().all(|r| r.components_count >= 3));
        assert!(rankings.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_failed_state_is_absent() {
        let mut records = state_rows("AA", "10");
        records.extend(state_rows("BB", "10"));

        let mut source = Recording::new(records);
        source.fail_states = vec!["AA"];

        let rankings =
            get_health_rankings(&source, 2021, &RankingsConfig::default(), 1000).await;
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].state, "BB");
    }

    #[tokio::test]
    async fn test_failed_sample_is_empty() {
        let mut source = Recording::new(state_rows("AA", "10"));
        source.fail_sample = true;

        let rankings =
            get_health_rankings(&source, 2021, &RankingsConfig::default(), 1000).await;
        assert!(rankings.is_empty());
        assert!(source.scored.lock().unwrap().is_empty());
    }

    #[test]
    fn test_discover_states() {
        let records = vec![
            sample_record("WA", "Washington", 2021, "t", "q", "1"),
            sample_record("US", "United States", 2021, "t", "q", "1"),
            sample_record("WA", "Washington", 2021, "t", "q", "2"),
            sample_record("GU", "Guam", 2021, "t", "q", "1"),
            sample_record("ABC", "Nowhere", 2021, "t", "q", "1"),
        ];
        let states = discover_states(&records);
        assert_eq!(
            states,
            vec![
                ("WA".to_string(), Some("Washington".to_string())),
                ("GU".to_string(), Some("Guam".to_string())),
            ]
        );
    }
}
