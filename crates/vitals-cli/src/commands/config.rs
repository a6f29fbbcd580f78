//! Config command implementation

use std::path::Path;

use anyhow::{Context, Result};
use vitals_core::config::default_config_path;
use vitals_core::Config;

pub fn cmd_config(config_path: Option<&Path>, data: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    let origin = match config_path {
        Some(path) => path.display().to_string(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        },
    };

    println!();
    println!("⚙️  Vitals Configuration");
    println!("   Loaded from: {}", origin);
    println!("   ─────────────────────────────────────────────────────────────");
    println!();
    println!("   Source");
    match data {
        Some(path) => println!("     Local data:     {}", path.display()),
        None => println!("     URL:            {}", config.source.base_url),
    }
    println!("     Timeout:        {}s", config.source.timeout.as_secs());
    println!("     Row limit:      {}", config.source.default_limit);
    println!(
        "     App token:      {}",
        if config.source.app_token.is_some() { "set" } else { "not set" }
    );
    println!();
    println!("   Cache");
    println!("     Enabled:        {}", config.cache.enabled);
    match config.cache.ttl {
        Some(ttl) => println!("     TTL:            {}s", ttl.as_secs()),
        None => println!("     TTL:            none"),
    }
    println!();
    println!("   Analysis");
    println!("     Correlation:    {}", config.analysis.correlation_year);
    println!("     Regional:       {}", config.analysis.regional_year);
    println!("     Anomaly from:   {}", config.analysis.anomaly_min_year);
    println!(
        "     Forecast:       {} onward, target {}",
        config.analysis.forecast_min_year, config.analysis.forecast_target_year
    );
    println!();
    println!("   Rankings");
    println!("     Max states:     {}", config.rankings.max_states);
    println!("     Min metrics:    {}", config.rankings.min_components);
    println!("     Concurrency:    {}", config.rankings.concurrency);
    println!();
    Ok(())
}
