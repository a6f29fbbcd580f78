//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vitals_core::DEFAULT_YEAR;

/// Vitals - Insights from the CDC chronic disease indicators
#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Chronic disease indicator insight engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data-dir override, then built-in settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analyze a local JSON dump of indicator rows instead of the live API
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate insights across all analyzers
    Insights {
        /// Show at most this many insights
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show one insight type (improvement, concern, correlation, anomaly, geographic, prediction)
        #[arg(short = 't', long = "type")]
        insight_type: Option<String>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Composite health score for one state
    Score {
        /// Two-letter state code (e.g. OH)
        state: String,

        /// Data year
        #[arg(short, long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank states by composite health score
    Rankings {
        /// Data year
        #[arg(short, long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// One indicator over time for a location
    Timeseries {
        /// Indicator topic (e.g. Diabetes)
        #[arg(long)]
        topic: String,

        /// Indicator question text
        #[arg(short, long)]
        question: String,

        /// Location code
        #[arg(short, long, default_value = "US")]
        state: String,

        /// Stratification category
        #[arg(long, default_value = "Overall")]
        stratification: String,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// One indicator across states for a year
    Compare {
        /// Indicator topic (e.g. Diabetes)
        #[arg(long)]
        topic: String,

        /// Indicator question text
        #[arg(short, long)]
        question: String,

        /// Data year
        #[arg(short, long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// Stratification category
        #[arg(long, default_value = "Overall")]
        stratification: String,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Show the resolved configuration
    Config,
}
