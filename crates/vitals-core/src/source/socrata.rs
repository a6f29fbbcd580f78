//! Socrata (SODA) HTTP data source
//!
//! Issues one GET per query against a dataset resource URL such as
//! `https://data.cdc.gov/resource/hksd-2xuw.json`. Query fields become
//! equality filters (`?topic=Diabetes&yearstart=2021`); `$limit` is appended
//! unless the query already carries one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::models::{Query, Record};

use super::DataSource;

/// Header used by Socrata for application tokens (raises rate limits)
const APP_TOKEN_HEADER: &str = "X-App-Token";

/// HTTP client for a Socrata dataset
#[derive(Clone)]
pub struct SocrataClient {
    http_client: Client,
    base_url: String,
    app_token: Option<String>,
}

impl SocrataClient {
    /// Create a client for a dataset resource URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_token: None,
        })
    }

    /// Create a client from source configuration
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let mut client = Self::new(&config.base_url, config.timeout)?;
        client.app_token = config.app_token.clone();
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query-string pairs for a request
    fn query_pairs(query: &Query, limit: usize) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = query
            .params()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if query.get("$limit").is_none() {
            pairs.push(("$limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[async_trait]
impl DataSource for SocrataClient {
    async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        let pairs = Self::query_pairs(query, limit);
        debug!(url = %self.base_url, query = %query, limit, "Fetching from Socrata");

        let mut request = self.http_client.get(&self.base_url).query(&pairs);
        if let Some(ref token) = self.app_token {
            request = request.header(APP_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let records: Vec<Record> = response.json().await?;
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "socrata"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_record, MockSocrataServer};

    #[test]
    fn test_query_pairs_appends_limit() {
        let pairs = SocrataClient::query_pairs(&Query::new().topic("Diabetes"), 500);
        assert_eq!(
            pairs,
            vec![
                ("topic".to_string(), "Diabetes".to_string()),
                ("$limit".to_string(), "500".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_respects_explicit_limit() {
        let query = Query::new().year(2021).field("$limit", 1000);
        let pairs = SocrataClient::query_pairs(&query, 10_000);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "$limit").count(), 1);
        assert!(pairs.contains(&("$limit".to_string(), "1000".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_filters_on_server() {
        let server = MockSocrataServer::start(vec![
            sample_record("OH", "Ohio", 2021, "Diabetes", "diabetes q", "10.1"),
            sample_record("TX", "Texas", 2021, "Diabetes", "diabetes q", "12.4"),
            sample_record("OH", "Ohio", 2021, "Cancer", "cancer q", "160.0"),
        ])
        .await;

        let client = SocrataClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let records = client
            .fetch(&Query::new().topic("Diabetes"), 100)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.topic.as_deref() == Some("Diabetes")));
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_applies_limit() {
        let rows = (0..10)
            .map(|i| sample_record("OH", "Ohio", 2010 + i, "Diabetes", "q", "5.0"))
            .collect();
        let server = MockSocrataServer::start(rows).await;

        let client = SocrataClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let records = client.fetch(&Query::new(), 4).await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_reports_upstream_errors() {
        let server = MockSocrataServer::failing().await;
        let client = SocrataClient::new(&server.url(), Duration::from_secs(5)).unwrap();

        let err = client.fetch(&Query::new(), 10).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 500, .. }));
    }
}
