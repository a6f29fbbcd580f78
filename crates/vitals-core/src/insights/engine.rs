//! Insight Engine - runs the analyzers and merges their findings

use async_trait::async_trait;
use futures::future::join_all;

use crate::config::AnalysisConfig;
use crate::source::{DataSource, DEFAULT_FETCH_LIMIT};
use crate::Result;

use super::types::Insight;
use super::{AnomalyAnalyzer, CorrelationAnalyzer, ForecastAnalyzer, RegionalAnalyzer, TrendAnalyzer};

/// Context provided to analyzers
pub struct AnalysisContext<'a> {
    /// Where raw rows come from
    pub source: &'a dyn DataSource,
    /// Years and thresholds for the fixed indicators
    pub config: &'a AnalysisConfig,
    /// Row limit for each fetch
    pub limit: usize,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(source: &'a dyn DataSource, config: &'a AnalysisConfig) -> Self {
        Self {
            source,
            config,
            limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Trait for insight analyzers
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Stable identifier used in logs
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze data and produce insights
    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Insight>>;
}

/// Runs every registered analyzer and orders the merged output
pub struct InsightEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in analyzers
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(TrendAnalyzer::new()));
        engine.register(Box::new(CorrelationAnalyzer::new()));
        engine.register(Box::new(AnomalyAnalyzer::new()));
        engine.register(Box::new(RegionalAnalyzer::new()));
        engine.register(Box::new(ForecastAnalyzer::new()));

        engine
    }

    /// Create an engine with no analyzers
    pub fn empty() -> Self {
        Self { analyzers: vec![] }
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Run all analyzers concurrently and merge their insights
    ///
    /// A failing analyzer is logged and contributes nothing. Output is sorted
    /// by descending significance; ties keep registration order.
    pub async fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let results = join_all(self.analyzers.iter().map(|a| a.analyze(ctx))).await;

        let mut insights = vec![];
        for (analyzer, result) in self.analyzers.iter().zip(results) {
            match result {
                Ok(found) => {
                    tracing::debug!(
                        analyzer = analyzer.id(),
                        count = found.len(),
                        "Analysis complete"
                    );
                    insights.extend(found);
                }
                Err(e) => {
                    tracing::warn!(
                        analyzer = analyzer.id(),
                        error = %e,
                        "Analysis failed"
                    );
                }
            }
        }

        insights.sort_by(|a, b| b.significance.total_cmp(&a.significance));

        tracing::info!(count = insights.len(), "Generated insights");
        insights
    }

    /// Identifiers of registered analyzers, in registration order
    pub fn analyzer_ids(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.id()).collect()
    }
}
