//! Record normalization
//!
//! Turns loosely typed upstream rows into `(state, name, year, value)`
//! observations. Malformed rows are skipped, never reported as errors: every
//! analyzer works with whatever partial data survives the filter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Record, SeriesPoint};

/// One typed observation extracted from a raw record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub state: String,
    pub name: String,
    pub year: Option<i32>,
    pub value: f64,
}

/// Filter predicates applied while normalizing
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Substring the question text must contain (case-sensitive)
    pub question_contains: Option<String>,
    /// Drop observations from years before this one
    pub min_year: Option<i32>,
    /// Drop observations without a parseable year
    pub require_year: bool,
    /// Keep the national aggregate row
    pub include_aggregate: bool,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question_contains(mut self, needle: impl Into<String>) -> Self {
        self.question_contains = Some(needle.into());
        self
    }

    pub fn min_year(mut self, year: i32) -> Self {
        self.min_year = Some(year);
        self.require_year = true;
        self
    }

    pub fn require_year(mut self) -> Self {
        self.require_year = true;
        self
    }

    pub fn include_aggregate(mut self) -> Self {
        self.include_aggregate = true;
        self
    }

    /// Apply the filter to one record
    pub fn apply(&self, record: &Record) -> Option<Observation> {
        let state = record.location()?;
        if !self.include_aggregate && record.is_aggregate() {
            return None;
        }

        if let Some(ref needle) = self.question_contains {
            if !record.question_text().contains(needle.as_str()) {
                return None;
            }
        }

        let value = record.value()?;
        let year = record.year();

        if self.require_year && year.is_none() {
            return None;
        }
        if let (Some(floor), Some(y)) = (self.min_year, year) {
            if y < floor {
                return None;
            }
        }

        Some(Observation {
            state: state.to_string(),
            name: record.location_name().unwrap_or(state).to_string(),
            year,
            value,
        })
    }
}

/// Normalize a batch of records, silently dropping those that fail the filter
pub fn normalize(records: &[Record], filter: &RecordFilter) -> Vec<Observation> {
    let observations: Vec<Observation> = records.iter().filter_map(|r| filter.apply(r)).collect();

    let dropped = records.len() - observations.len();
    if dropped > 0 {
        tracing::trace!(
            kept = observations.len(),
            dropped,
            "Normalized records"
        );
    }

    observations
}

/// All observations for one state
#[derive(Debug, Clone, PartialEq)]
pub struct StateSeries {
    pub state: String,
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl StateSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Number of distinct years in the series
    pub fn distinct_years(&self) -> usize {
        let mut years: Vec<i32> = self.points.iter().map(|p| p.year).collect();
        years.sort_unstable();
        years.dedup();
        years.len()
    }

    /// Points ordered ascending by year
    pub fn sorted_by_year(&self) -> Vec<SeriesPoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.year);
        points
    }
}

/// Group observations by state, preserving first-seen order of states
///
/// Observations without a year are recorded with year 0; callers that need
/// real years should normalize with [`RecordFilter::require_year`].
pub fn group_by_state(observations: &[Observation]) -> Vec<StateSeries> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<StateSeries> = Vec::new();

    for obs in observations {
        let slot = *index.entry(obs.state.as_str()).or_insert_with(|| {
            groups.push(StateSeries {
                state: obs.state.clone(),
                name: obs.name.clone(),
                points: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].points.push(SeriesPoint {
            year: obs.year.unwrap_or(0),
            value: obs.value,
        });
    }

    groups
}

/// Keep only series with at least `min_len` points
pub fn with_min_points(series: Vec<StateSeries>, min_len: usize) -> Vec<StateSeries> {
    series
        .into_iter()
        .filter(|s| s.points.len() >= min_len)
        .collect()
}
