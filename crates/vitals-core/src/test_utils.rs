//! Test utilities for vitals-core
//!
//! Provides a mock Socrata server for exercising the HTTP client, plus
//! helpers for building dataset rows.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query as QueryParams, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::sync::oneshot;

use crate::models::{Query, Record, OVERALL};
use crate::source::{DataSource, InMemorySource};

/// Build a dataset row with the fields analyzers care about
pub fn sample_record(
    state: &str,
    name: &str,
    year: i32,
    topic: &str,
    question: &str,
    value: &str,
) -> Record {
    Record {
        locationabbr: Some(state.to_string()),
        locationdesc: Some(name.to_string()),
        yearstart: Some(year.to_string()),
        yearend: Some(year.to_string()),
        topic: Some(topic.to_string()),
        question: Some(question.to_string()),
        stratificationcategory1: Some(OVERALL.to_string()),
        stratification1: Some(OVERALL.to_string()),
        datavalue: Some(value.to_string()),
        ..Default::default()
    }
}

struct MockState {
    source: InMemorySource,
    fail: bool,
    requests: AtomicUsize,
}

/// Mock Socrata dataset endpoint for testing
pub struct MockSocrataServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSocrataServer {
    /// Start a server that answers queries from `records`
    pub async fn start(records: Vec<Record>) -> Self {
        Self::spawn(MockState {
            source: InMemorySource::new(records),
            fail: false,
            requests: AtomicUsize::new(0),
        })
        .await
    }

    /// Start a server that answers every request with HTTP 500
    pub async fn failing() -> Self {
        Self::spawn(MockState {
            source: InMemorySource::default(),
            fail: true,
            requests: AtomicUsize::new(0),
        })
        .await
    }

    async fn spawn(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/", get(handle_query))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the dataset URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSocrataServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Dataset endpoint: equality filters plus `$limit`
async fn handle_query(
    State(state): State<Arc<MockState>>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    if state.fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    let query = params
        .into_iter()
        .fold(Query::new(), |q, (key, value)| q.field(key, value));

    match state.source.fetch(&query, usize::MAX).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
