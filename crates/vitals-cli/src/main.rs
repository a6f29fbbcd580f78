//! Vitals CLI - Chronic disease indicator insights
//!
//! Usage:
//!   vitals insights              Generate insights from the live dataset
//!   vitals score OH --year 2021  Composite health score for a state
//!   vitals rankings              Rank states by health score
//!   vitals serve --port 3000     Start the HTTP API

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();
    let data = cli.data.as_deref();
    let open = || commands::open_analytics(config, data);

    match cli.command {
        Commands::Insights {
            limit,
            insight_type,
            json,
        } => commands::cmd_insights(&open()?, insight_type.as_deref(), limit, json).await,
        Commands::Score { state, year, json } => {
            commands::cmd_score(&open()?, &state, year, json).await
        }
        Commands::Rankings { year, json } => commands::cmd_rankings(&open()?, year, json).await,
        Commands::Timeseries {
            topic,
            question,
            state,
            stratification,
            json,
        } => {
            let indicator = commands::indicator(topic, question, stratification);
            commands::cmd_timeseries(&open()?, &indicator, &state, json).await
        }
        Commands::Compare {
            topic,
            question,
            year,
            stratification,
            json,
        } => {
            let indicator = commands::indicator(topic, question, stratification);
            commands::cmd_compare(&open()?, &indicator, year, json).await
        }
        Commands::Serve {
            port,
            host,
            cors_origins,
        } => commands::cmd_serve(open()?, &host, port, cors_origins).await,
        Commands::Config => commands::cmd_config(config, data),
    }
}
