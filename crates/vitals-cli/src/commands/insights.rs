//! Insight command implementation

use anyhow::{anyhow, Result};
use vitals_core::{HealthAnalytics, Insight, InsightType};

use super::{print_json, truncate};

/// Icon shown next to each insight type
pub fn insight_icon(insight_type: InsightType) -> &'static str {
    match insight_type {
        InsightType::Improvement => "📉",
        InsightType::Concern => "📈",
        InsightType::Correlation => "🔗",
        InsightType::Anomaly => "⚠️ ",
        InsightType::Geographic => "🗺️ ",
        InsightType::Prediction => "🔮",
    }
}

/// Keep insights of one type (when given), then cap the count
pub fn select_insights(
    insights: Vec<Insight>,
    insight_type: Option<InsightType>,
    limit: Option<usize>,
) -> Vec<Insight> {
    insights
        .into_iter()
        .filter(|i| insight_type.map_or(true, |t| i.insight_type == t))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

pub async fn cmd_insights(
    analytics: &HealthAnalytics,
    insight_type: Option<&str>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let filter = insight_type
        .map(str::parse::<InsightType>)
        .transpose()
        .map_err(|e| anyhow!(e))?;

    let insights = select_insights(analytics.generate_insights().await, filter, limit);

    if json {
        return print_json(&insights);
    }

    println!();
    println!("🔍 Chronic Disease Insights");
    println!("   Source: {}", analytics.source_name());
    println!(
        "   Generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if insights.is_empty() {
        println!();
        println!("   No insights found (upstream unavailable or not enough data)");
        println!();
        return Ok(());
    }

    for insight in &insights {
        println!();
        println!(
            "   {} [{:>3.0}] {}",
            insight_icon(insight.insight_type),
            insight.significance,
            insight.title
        );
        println!(
            "         {} · {}",
            insight.insight_type,
            truncate(&insight.category, 40)
        );
        println!("         {}", insight.description);
    }

    println!();
    println!("   {} insight(s)", insights.len());
    println!();
    Ok(())
}
