//! Health score and ranking command implementations

use anyhow::{bail, Result};
use vitals_core::{HealthAnalytics, HealthMetric, HealthScoreResult};

use super::{format_value, print_json, truncate};

/// Ten-cell bar for a 0-100 score
pub fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 100.0) / 10.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

pub async fn cmd_score(analytics: &HealthAnalytics, state: &str, year: i32, json: bool) -> Result<()> {
    let Some(result) = analytics.calculate_health_score(state, year).await else {
        bail!("Could not fetch data for {} in {}", state, year);
    };

    if json {
        return print_json(&result);
    }

    print_score(&result);
    Ok(())
}

fn print_score(result: &HealthScoreResult) {
    let name = result.name.as_deref().unwrap_or(&result.state);

    println!();
    println!("🩺 Health Score: {} ({}, {})", name, result.state, result.year);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Score: {:.1} {}", result.score, score_bar(result.score));
    println!("   Components: {}/{}", result.components_count, HealthMetric::ALL.len());
    println!();

    for metric in HealthMetric::ALL {
        println!(
            "   {:<10} {:>8}",
            metric.as_str(),
            format_value(result.metrics.get(metric))
        );
    }

    if result.components_count == 0 {
        println!();
        println!("   No matching indicators for this state and year");
    }
    println!();
}

pub async fn cmd_rankings(analytics: &HealthAnalytics, year: i32, json: bool) -> Result<()> {
    let rankings = analytics.get_health_rankings(year).await;

    if json {
        return print_json(&rankings);
    }

    println!();
    println!("🏆 Health Rankings ({})", year);
    println!("   ─────────────────────────────────────────────────────────────");

    if rankings.is_empty() {
        println!("   No states with enough data for {}", year);
        println!();
        return Ok(());
    }

    for (i, result) in rankings.iter().enumerate() {
        let name = result.name.as_deref().unwrap_or(&result.state);
        println!(
            "   {:>2}. {:<2} {:<22} {:>5.1} {}  ({} metrics)",
            i + 1,
            result.state,
            truncate(name, 22),
            result.score,
            score_bar(result.score),
            result.components_count
        );
    }

    println!();
    Ok(())
}
