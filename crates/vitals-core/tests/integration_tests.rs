//! Integration tests for vitals-core
//!
//! These tests run the full fetch → normalize → analyze → rank workflow
//! against a small dump of the Chronic Disease Indicators dataset.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vitals_core::{
    config::Config,
    explore::Indicator,
    insights::InsightType,
    source::{DataSource, InMemorySource},
    HealthAnalytics, Query,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cdi_sample.json")
}

fn analytics() -> HealthAnalytics {
    let source = InMemorySource::from_file(&fixture_path()).expect("Failed to load fixture");
    HealthAnalytics::new(Arc::new(source), Config::default())
}

// =============================================================================
// Insight generation
// =============================================================================

#[tokio::test]
async fn test_every_insight_type_is_produced() {
    let insights = analytics().generate_insights().await;

    for expected in [
        InsightType::Improvement,
        InsightType::Concern,
        InsightType::Correlation,
        InsightType::Anomaly,
        InsightType::Geographic,
        InsightType::Prediction,
    ] {
        assert!(
            insights.iter().any(|i| i.insight_type == expected),
            "missing {} insight",
            expected
        );
    }

    // 3 improvers, 3 decliners, correlation, ratio outlier, cancer outlier,
    // regional comparison, forecast
    assert_eq!(insights.len(), 11);
}

#[tokio::test]
async fn test_insights_sorted_by_significance() {
    let insights = analytics().generate_insights().await;

    assert!(insights
        .windows(2)
        .all(|w| w[0].significance >= w[1].significance));

    // Kentucky's cancer mortality is far above every other state
    assert_eq!(insights[0].insight_type, InsightType::Anomaly);
    assert_eq!(insights[0].title, "Kentucky has elevated cancer mortality");
    assert_eq!(insights[0].significance, 95.0);
}

#[tokio::test]
async fn test_insight_details() {
    let insights = analytics().generate_insights().await;

    let improvers: Vec<&str> = insights
        .iter()
        .filter(|i| i.insight_type == InsightType::Improvement)
        .map(|i| i.data["state"].as_str().unwrap())
        .collect();
    assert_eq!(improvers, vec!["CT", "NY", "PA"]);

    let concerns: Vec<&str> = insights
        .iter()
        .filter(|i| i.insight_type == InsightType::Concern)
        .map(|i| i.data["state"].as_str().unwrap())
        .collect();
    assert_eq!(concerns, vec!["UT", "WA", "CA"]);

    let ratio = insights
        .iter()
        .find(|i| i.category == "Statistical Anomalies")
        .unwrap();
    assert_eq!(ratio.data["state"], "UT");

    let regional = insights
        .iter()
        .find(|i| i.insight_type == InsightType::Geographic)
        .unwrap();
    assert_eq!(regional.data["highest"]["region"], "Southeast");
    assert_eq!(regional.data["lowest"]["region"], "West");

    let forecast = insights
        .iter()
        .find(|i| i.insight_type == InsightType::Prediction)
        .unwrap();
    assert_eq!(forecast.data["trend"], "declining");
    assert!(forecast.description.contains("decrease"));
}

#[tokio::test]
async fn test_generate_insights_is_idempotent() {
    let analytics = analytics();
    let first = analytics.generate_insights().await;
    let second = analytics.generate_insights().await;
    assert_eq!(first, second);
}

// =============================================================================
// Scores and rankings
// =============================================================================

#[tokio::test]
async fn test_health_score() {
    let score = analytics()
        .calculate_health_score("OH", 2021)
        .await
        .expect("score");

    assert_eq!(score.name.as_deref(), Some("Ohio"));
    assert_eq!(score.components_count, 5);
    assert!(score.metrics.cancer.is_none());
    assert!((0.0..=100.0).contains(&score.score));
}

#[tokio::test]
async fn test_health_rankings() {
    let rankings = analytics().get_health_rankings(2021).await;

    assert_eq!(rankings.len(), 18);
    assert_eq!(rankings[0].state, "CT");
    assert!(rankings.iter().all(|r| r.state != "US"));
    assert!(rankings.iter().all(|r| r.components_count >= 3));
    assert!(rankings.windows(2).all(|w| w[0].score >= w[1].score));
}

// =============================================================================
// Exploration
// =============================================================================

#[tokio::test]
async fn test_time_series_and_comparison() {
    let analytics = analytics();
    let indicator = Indicator::new(
        "Diabetes",
        "Prevalence of diagnosed diabetes among adults aged >= 18 years",
    );

    let series = analytics.time_series(&indicator, "US").await.unwrap();
    let years: Vec<i32> = series.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2017, 2018, 2019, 2020, 2021]);

    let comparison = analytics.state_comparison(&indicator, 2021).await.unwrap();
    assert_eq!(comparison.len(), 18);
    assert!(comparison.windows(2).all(|w| w[0].value >= w[1].value));
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_unreachable_upstream_degrades_gracefully() {
    let mut config = Config::default();
    config.source.base_url = "http://127.0.0.1:9/resource/none.json".to_string();
    config.source.timeout = Duration::from_secs(2);

    let analytics = HealthAnalytics::from_config(config).unwrap();

    assert!(analytics.generate_insights().await.is_empty());
    assert!(analytics.calculate_health_score("OH", 2021).await.is_none());
    assert!(analytics.get_health_rankings(2021).await.is_empty());

    let indicator = Indicator::new("Diabetes", "q");
    assert!(analytics.time_series(&indicator, "US").await.is_err());
}

#[tokio::test]
async fn test_fixture_loads_all_rows() {
    let source = InMemorySource::from_file(&fixture_path()).unwrap();
    let all = source.fetch(&Query::new(), usize::MAX).await.unwrap();
    assert_eq!(all.len(), source.len());
    assert!(all.iter().any(|r| r.value().is_none()));
}
