//! In-memory data source
//!
//! Serves rows from memory, evaluating queries as exact field equality the
//! way the Socrata endpoint does for simple filters. SoQL parameters (keys
//! starting with `$`) are ignored. Used for offline analysis of a downloaded
//! JSON dump and throughout the tests.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Query, Record};

use super::DataSource;

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Record>,
}

impl InMemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load a JSON array of dataset rows
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<Record> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Load a JSON dump from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matches(record: &Record, query: &Query) -> bool {
        query
            .params()
            .filter(|(key, _)| !key.starts_with('$'))
            .all(|(key, value)| record.field(key) == Some(value))
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        let limit = query
            .get("$limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(limit);

        Ok(self
            .records
            .iter()
            .filter(|r| Self::matches(r, query))
            .take(limit)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
