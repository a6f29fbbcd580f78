//! Server command implementation

use anyhow::Result;
use vitals_core::HealthAnalytics;

pub async fn cmd_serve(
    analytics: HealthAnalytics,
    host: &str,
    port: u16,
    cors_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Vitals API server...");
    println!("   Source: {}", analytics.source_name());
    println!("   Listening: http://{}:{}", host, port);
    if analytics.config().cache.enabled {
        match analytics.config().cache.ttl {
            Some(ttl) => println!("   Cache: enabled ({}s TTL)", ttl.as_secs()),
            None => println!("   Cache: enabled (no expiry)"),
        }
    } else {
        println!("   Cache: disabled");
    }
    if !cors_origins.is_empty() {
        println!("   CORS origins: {}", cors_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = vitals_server::ServerConfig {
        allowed_origins: cors_origins,
    };

    vitals_server::serve(analytics, host, port, config).await
}
