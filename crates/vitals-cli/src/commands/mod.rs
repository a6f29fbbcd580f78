//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `insights` - Insight generation
//! - `scores` - Health score and rankings
//! - `explore` - Time series and state comparison
//! - `serve` - Web server command
//! - `config` - Resolved configuration display

pub mod config;
pub mod explore;
pub mod insights;
pub mod scores;
pub mod serve;

// Re-export command functions for main.rs
pub use config::*;
pub use explore::*;
pub use insights::*;
pub use scores::*;
pub use serve::*;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vitals_core::{Config, HealthAnalytics, InMemorySource, Indicator};

/// Build the analysis facade from `--config` and `--data`
///
/// With `--data` the rows come from a local JSON dump and no upstream
/// request is made.
pub fn open_analytics(config_path: Option<&Path>, data: Option<&Path>) -> Result<HealthAnalytics> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    match data {
        Some(path) => {
            let source = InMemorySource::from_file(path)
                .with_context(|| format!("Failed to load data from {}", path.display()))?;
            tracing::debug!(rows = source.len(), path = %path.display(), "Using local data");
            Ok(HealthAnalytics::new(Arc::new(source), config))
        }
        None => HealthAnalytics::from_config(config).context("Failed to create Socrata client"),
    }
}

/// Indicator from command-line parts
pub fn indicator(topic: String, question: String, stratification: String) -> Indicator {
    Indicator::new(topic, question).with_stratification(stratification)
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional number with one decimal, or a dash
pub fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
