//! Indicator exploration commands (timeseries, compare)

use anyhow::{Context, Result};
use vitals_core::{HealthAnalytics, Indicator};

use super::{format_value, print_json, truncate};

pub async fn cmd_timeseries(
    analytics: &HealthAnalytics,
    indicator: &Indicator,
    state: &str,
    json: bool,
) -> Result<()> {
    let location = state.trim().to_uppercase();
    let points = analytics
        .time_series(indicator, &location)
        .await
        .context("Failed to fetch time series data")?;

    if json {
        return print_json(&points);
    }

    println!();
    println!("📈 {} ({})", truncate(&indicator.question, 60), location);
    println!("   {} · {}", indicator.topic, indicator.stratification);
    println!("   ─────────────────────────────────────────────────────────────");

    if points.is_empty() {
        println!("   No data points found");
    }
    for point in &points {
        println!(
            "   {}  {:>8.1} {:<10}  CI {} - {}",
            point.year,
            point.value,
            point.unit.as_deref().unwrap_or(""),
            format_value(point.low_ci),
            format_value(point.high_ci)
        );
    }

    println!();
    Ok(())
}

pub async fn cmd_compare(
    analytics: &HealthAnalytics,
    indicator: &Indicator,
    year: i32,
    json: bool,
) -> Result<()> {
    let values = analytics
        .state_comparison(indicator, year)
        .await
        .context("Failed to fetch state comparison data")?;

    if json {
        return print_json(&values);
    }

    println!();
    println!("🗺️  {} ({})", truncate(&indicator.question, 60), year);
    println!("   {} · {}", indicator.topic, indicator.stratification);
    println!("   ─────────────────────────────────────────────────────────────");

    if values.is_empty() {
        println!("   No state values found");
    }
    for value in &values {
        println!(
            "   {:<2} {:<22} {:>8.1} {}",
            value.state,
            truncate(value.state_name.as_deref().unwrap_or(""), 22),
            value.value,
            value.unit.as_deref().unwrap_or("")
        );
    }

    println!();
    Ok(())
}
