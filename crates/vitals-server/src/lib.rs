//! Vitals Web Server
//!
//! Axum-based REST API exposing the Vitals analysis core.
//!
//! - `GET /health` liveness probe
//! - `GET /api/insights` ranked insights
//! - `GET /api/health-rankings` states ranked by composite score
//! - `GET /api/health-score/:state` one state's composite score
//! - `GET /api/timeseries`, `GET /api/state-comparison` indicator views
//!
//! Errors are returned as `{ "error": "..." }` with internal details logged,
//! never sent to the client.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use vitals_core::HealthAnalytics;

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub analytics: HealthAnalytics,
    pub config: ServerConfig,
}

/// Create the router with all API routes
pub fn create_router(analytics: HealthAnalytics, config: ServerConfig) -> Router {
    let cors = build_cors(&config);
    let state = Arc::new(AppState { analytics, config });

    let api_routes = Router::new()
        .route("/insights", get(handlers::get_insights))
        .route("/health-rankings", get(handlers::get_health_rankings))
        .route("/health-score/:state", get(handlers::get_health_score))
        .route("/timeseries", get(handlers::get_timeseries))
        .route("/state-comparison", get(handlers::get_state_comparison));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(
    analytics: HealthAnalytics,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        source = analytics.source_name(),
        cache = analytics.config().cache.enabled,
        "Analysis core ready"
    );

    let app = create_router(analytics, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Internal failure with a client-safe message; `err` is only logged
    pub fn internal(msg: &str, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: Some(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
