//! Data retrieval layer
//!
//! The analysis core consumes a single capability: fetch the rows matching an
//! equality query. Implementations:
//!
//! - `SocrataClient`: HTTP client for the CDC Socrata (SODA) endpoint
//! - `CachedSource`: memoizing wrapper keyed by query + limit
//! - `InMemorySource`: serves rows from a local JSON dump (offline use, tests)
//!
//! Analyzers never see transport errors: [`fetch_or_empty`] logs the failure
//! and hands back an empty batch, which every analyzer treats as "nothing to
//! report".

mod cache;
mod memory;
mod socrata;

pub use cache::{CacheStats, CachedSource};
pub use memory::InMemorySource;
pub use socrata::SocrataClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Query, Record};

/// Default row limit for a fetch when the caller has no better bound
pub const DEFAULT_FETCH_LIMIT: usize = 10_000;

/// Source of raw dataset rows
///
/// Fetches must be idempotent and side-effect free so results can be cached
/// and shared between concurrent callers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch up to `limit` rows matching `query`
    async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for std::sync::Arc<S> {
    async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        (**self).fetch(query, limit).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Fetch rows, converting any failure into an empty batch
pub async fn fetch_or_empty(source: &dyn DataSource, query: &Query, limit: usize) -> Vec<Record> {
    match source.fetch(query, limit).await {
        Ok(records) => {
            tracing::debug!(
                source = source.name(),
                query = %query,
                count = records.len(),
                "Fetched records"
            );
            records
        }
        Err(e) => {
            tracing::warn!(
                source = source.name(),
                query = %query,
                error = %e,
                "Fetch failed, continuing with no data"
            );
            vec![]
        }
    }
}
