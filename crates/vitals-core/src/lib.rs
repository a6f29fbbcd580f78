//! Vitals Core Library
//!
//! Shared functionality for the Vitals chronic-disease insight engine:
//! - Data retrieval from the CDC Chronic Disease Indicators dataset (Socrata)
//! - Query-keyed retrieval cache
//! - Statistical primitives and record normalization
//! - Pluggable insight analyzers (trends, correlations, anomalies, regions, forecasts)
//! - Composite per-state health scores and rankings
//! - Layered TOML configuration

pub mod analytics;
pub mod config;
pub mod error;
pub mod explore;
pub mod insights;
pub mod models;
pub mod normalize;
pub mod rankings;
pub mod scoring;
pub mod source;
pub mod stats;

/// Test utilities including mock Socrata server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::HealthAnalytics;
pub use config::Config;
pub use error::{Error, Result};
pub use explore::{Indicator, StateValue, TimeSeriesPoint};
pub use insights::{Insight, InsightEngine, InsightType};
pub use models::{Query, Record, SeriesPoint, DEFAULT_YEAR};
pub use scoring::{HealthMetric, HealthMetrics, HealthScoreResult};
pub use source::{CachedSource, DataSource, InMemorySource, SocrataClient};
