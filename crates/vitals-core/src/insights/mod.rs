//! Insight Engine - scored findings from chronic-disease indicators
//!
//! Each analyzer fetches the rows it needs, normalizes them, runs a small
//! statistical model and turns the interesting results into `Insight`s.
//!
//! ## Analyzers
//!
//! - **Trend** - fastest improving and worsening states for diabetes
//! - **Correlation** - obesity vs diabetes across states, plus ratio outliers
//! - **Anomaly** - states with unusual cancer mortality
//! - **Regional** - tobacco use compared across regions
//! - **Forecast** - national cardiovascular mortality extrapolated forward
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitals_core::insights::{AnalysisContext, InsightEngine};
//!
//! let engine = InsightEngine::new();
//! let ctx = AnalysisContext::new(&source, &config.analysis);
//! let insights = engine.generate(&ctx).await;
//! ```

pub mod anomaly;
pub mod correlation;
pub mod engine;
pub mod forecast;
pub mod regional;
pub mod trend;
pub mod types;

pub use anomaly::AnomalyAnalyzer;
pub use correlation::CorrelationAnalyzer;
pub use engine::{AnalysisContext, Analyzer, InsightEngine};
pub use forecast::ForecastAnalyzer;
pub use regional::{region_for, RegionalAnalyzer, REGIONS};
pub use trend::TrendAnalyzer;
pub use types::{
    CorrelationData, ForecastData, Insight, InsightType, RatioOutlier, RegionalAverage,
    RegionalComparison, StateAnomaly, TrendResult,
};
