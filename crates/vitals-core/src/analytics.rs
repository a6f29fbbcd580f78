//! Health analytics facade
//!
//! `HealthAnalytics` owns the data source (wrapped in a cache when enabled),
//! the configuration and the insight engine. The CLI and server both talk to
//! the analysis core through it.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::explore::{self, Indicator, StateValue, TimeSeriesPoint};
use crate::insights::{AnalysisContext, Insight, InsightEngine};
use crate::rankings;
use crate::scoring::{self, HealthScoreResult};
use crate::source::{CacheStats, CachedSource, DataSource, SocrataClient};

type SharedCache = CachedSource<Arc<dyn DataSource>>;

pub struct HealthAnalytics {
    source: Arc<dyn DataSource>,
    cache: Option<Arc<SharedCache>>,
    config: Config,
    engine: InsightEngine,
}

impl HealthAnalytics {
    /// Build on an existing source, adding a cache when the config enables it
    pub fn new(source: Arc<dyn DataSource>, config: Config) -> Self {
        let (source, cache) = if config.cache.enabled {
            let cache = Arc::new(CachedSource::with_ttl(source, config.cache.ttl));
            (cache.clone() as Arc<dyn DataSource>, Some(cache))
        } else {
            (source, None)
        };

        Self {
            source,
            cache,
            config,
            engine: InsightEngine::new(),
        }
    }

    /// Build against the Socrata endpoint named in the config
    pub fn from_config(config: Config) -> Result<Self> {
        let client = SocrataClient::from_config(&config.source)?;
        tracing::debug!(base_url = client.base_url(), "Using Socrata source");
        Ok(Self::new(Arc::new(client), config))
    }

    /// Replace the insight engine (e.g. with a custom analyzer set)
    pub fn with_engine(mut self, engine: InsightEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Run every analyzer and return insights ordered by significance
    pub async fn generate_insights(&self) -> Vec<Insight> {
        let ctx = AnalysisContext::new(self.source.as_ref(), &self.config.analysis)
            .with_limit(self.config.source.default_limit);
        self.engine.generate(&ctx).await
    }

    /// Composite score for one state-year; `None` when the fetch fails
    pub async fn calculate_health_score(&self, state: &str, year: i32) -> Option<HealthScoreResult> {
        let state = state.trim().to_uppercase();
        scoring::calculate_health_score(
            self.source.as_ref(),
            &state,
            year,
            self.config.source.default_limit,
        )
        .await
    }

    /// States ranked by composite score, best first
    pub async fn get_health_rankings(&self, year: i32) -> Vec<HealthScoreResult> {
        rankings::get_health_rankings(
            self.source.as_ref(),
            year,
            &self.config.rankings,
            self.config.source.default_limit,
        )
        .await
    }

    pub async fn time_series(
        &self,
        indicator: &Indicator,
        state: &str,
    ) -> Result<Vec<TimeSeriesPoint>> {
        explore::time_series(self.source.as_ref(), indicator, state).await
    }

    pub async fn state_comparison(
        &self,
        indicator: &Indicator,
        year: i32,
    ) -> Result<Vec<StateValue>> {
        explore::state_comparison(self.source.as_ref(), indicator, year).await
    }

    /// Cache counters, when caching is enabled
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => Some(cache.stats().await),
            None => None,
        }
    }

    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }
}
