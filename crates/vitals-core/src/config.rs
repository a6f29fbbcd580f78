//! Configuration loading
//!
//! Config is resolved in layers:
//! 1. An explicit path (e.g. `--config`), if given
//! 2. The override in the data dir (`~/.local/share/vitals/config.toml`)
//! 3. Embedded defaults (compiled into the binary)
//!
//! `VITALS_SOURCE_URL` and `VITALS_APP_TOKEN` override the source section.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/vitals.toml");

/// Upstream data source settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_limit: usize,
    #[serde(skip_serializing)]
    pub app_token: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.cdc.gov/resource/hksd-2xuw.json".to_string(),
            timeout: Duration::from_secs(30),
            default_limit: 10_000,
            app_token: None,
        }
    }
}

/// Retrieval cache settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// `None` keeps entries for the lifetime of the process
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Some(Duration::from_secs(3600)),
        }
    }
}

/// Years the fixed-indicator analyzers look at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub correlation_year: i32,
    pub regional_year: i32,
    pub anomaly_min_year: i32,
    pub forecast_min_year: i32,
    pub forecast_target_year: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            correlation_year: 2021,
            regional_year: 2021,
            anomaly_min_year: 2018,
            forecast_min_year: 2010,
            forecast_target_year: 2025,
        }
    }
}

/// Fewest metrics a ranked state may have; config cannot go lower
pub const MIN_RANKED_COMPONENTS: usize = 3;

/// Health ranking driver settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingsConfig {
    /// Maximum number of states scored per ranking
    pub max_states: usize,
    /// Minimum metrics a state needs to be ranked (at least `MIN_RANKED_COMPONENTS`)
    pub min_components: usize,
    /// Per-state scoring fetches in flight at once
    pub concurrency: usize,
    /// Rows sampled to discover state codes
    pub sample_limit: usize,
}

impl Default for RankingsConfig {
    fn default() -> Self {
        Self {
            max_states: 30,
            min_components: MIN_RANKED_COMPONENTS,
            concurrency: 4,
            sample_limit: 1000,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
    pub rankings: RankingsConfig,
}

impl Config {
    /// Load configuration (explicit path, then data-dir override, then defaults)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let mut config = parse_config(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("VITALS_SOURCE_URL") {
            if !url.is_empty() {
                self.source.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("VITALS_APP_TOKEN") {
            if !token.is_empty() {
                self.source.app_token = Some(token);
            }
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("vitals").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    source: Option<RawSource>,
    cache: Option<RawCache>,
    analysis: Option<RawAnalysis>,
    rankings: Option<RawRankings>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    default_limit: Option<usize>,
    app_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    enabled: Option<bool>,
    ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    correlation_year: Option<i32>,
    regional_year: Option<i32>,
    anomaly_min_year: Option<i32>,
    forecast_min_year: Option<i32>,
    forecast_target_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawRankings {
    max_states: Option<usize>,
    min_components: Option<usize>,
    concurrency: Option<usize>,
    sample_limit: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(source) = raw.source {
        if let Some(url) = source.base_url {
            config.source.base_url = url;
        }
        if let Some(timeout) = source.timeout_secs {
            config.source.timeout = Duration::from_secs(timeout);
        }
        if let Some(limit) = source.default_limit {
            config.source.default_limit = limit;
        }
        config.source.app_token = source.app_token.filter(|t| !t.is_empty());
    }

    if let Some(cache) = raw.cache {
        if let Some(enabled) = cache.enabled {
            config.cache.enabled = enabled;
        }
        if let Some(ttl) = cache.ttl_secs {
            config.cache.ttl = (ttl > 0).then(|| Duration::from_secs(ttl));
        }
    }

    if let Some(analysis) = raw.analysis {
        let a = &mut config.analysis;
        a.correlation_year = analysis.correlation_year.unwrap_or(a.correlation_year);
        a.regional_year = analysis.regional_year.unwrap_or(a.regional_year);
        a.anomaly_min_year = analysis.anomaly_min_year.unwrap_or(a.anomaly_min_year);
        a.forecast_min_year = analysis.forecast_min_year.unwrap_or(a.forecast_min_year);
        a.forecast_target_year = analysis
            .forecast_target_year
            .unwrap_or(a.forecast_target_year);
    }

    if let Some(rankings) = raw.rankings {
        let r = &mut config.rankings;
        r.max_states = rankings.max_states.unwrap_or(r.max_states);
        r.min_components = rankings
            .min_components
            .unwrap_or(r.min_components)
            .max(MIN_RANKED_COMPONENTS);
        r.concurrency = rankings.concurrency.unwrap_or(r.concurrency).max(1);
        r.sample_limit = rankings.sample_limit.unwrap_or(r.sample_limit);
    }

    Ok(config)
}
