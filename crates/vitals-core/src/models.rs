//! Data models for Vitals
//!
//! `Record` mirrors one row of the CDC Chronic Disease Indicators dataset as
//! served by the Socrata API. Every field arrives as a string (or is missing),
//! so parsing into numbers happens lazily through accessor methods.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Location code used by the dataset for national-level rows
pub const AGGREGATE_LOCATION: &str = "US";

/// Stratification value for unstratified rows
pub const OVERALL: &str = "Overall";

/// Year used for scores and rankings when the caller doesn't pick one
pub const DEFAULT_YEAR: i32 = 2021;

/// A single raw observation from the upstream dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub locationabbr: Option<String>,
    #[serde(default)]
    pub locationdesc: Option<String>,
    #[serde(default)]
    pub yearstart: Option<String>,
    #[serde(default)]
    pub yearend: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub stratificationcategory1: Option<String>,
    #[serde(default)]
    pub stratification1: Option<String>,
    #[serde(default)]
    pub datavalue: Option<String>,
    #[serde(default)]
    pub datavalueunit: Option<String>,
    #[serde(default)]
    pub datavaluetype: Option<String>,
    #[serde(default)]
    pub datasource: Option<String>,
    #[serde(default)]
    pub lowconfidencelimit: Option<String>,
    #[serde(default)]
    pub highconfidencelimit: Option<String>,
}

impl Record {
    /// Two-letter location code, if present and non-empty
    pub fn location(&self) -> Option<&str> {
        self.locationabbr
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Human-readable location name, falling back to the code
    pub fn location_name(&self) -> Option<&str> {
        self.locationdesc
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.location())
    }

    /// Whether this row describes the national aggregate
    pub fn is_aggregate(&self) -> bool {
        self.location() == Some(AGGREGATE_LOCATION)
    }

    /// Start year of the observation
    pub fn year(&self) -> Option<i32> {
        self.yearstart.as_deref().and_then(|y| y.trim().parse().ok())
    }

    /// Numeric value, if present and finite
    ///
    /// A zero value is reported as `None`: the dataset uses zero for
    /// suppressed cells, and downstream ratios divide by these values.
    pub fn value(&self) -> Option<f64> {
        parse_finite(self.datavalue.as_deref()).filter(|v| *v != 0.0)
    }

    /// Question text, or an empty string when missing
    pub fn question_text(&self) -> &str {
        self.question.as_deref().unwrap_or("")
    }

    pub fn low_ci(&self) -> Option<f64> {
        parse_finite(self.lowconfidencelimit.as_deref())
    }

    pub fn high_ci(&self) -> Option<f64> {
        parse_finite(self.highconfidencelimit.as_deref())
    }

    /// Look up a field by its upstream column name
    ///
    /// Used by in-memory sources to evaluate equality queries.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "locationabbr" => &self.locationabbr,
            "locationdesc" => &self.locationdesc,
            "yearstart" => &self.yearstart,
            "yearend" => &self.yearend,
            "topic" => &self.topic,
            "question" => &self.question,
            "stratificationcategory1" => &self.stratificationcategory1,
            "stratification1" => &self.stratification1,
            "datavalue" => &self.datavalue,
            "datavalueunit" => &self.datavalueunit,
            "datavaluetype" => &self.datavaluetype,
            "datasource" => &self.datasource,
            "lowconfidencelimit" => &self.lowconfidencelimit,
            "highconfidencelimit" => &self.highconfidencelimit,
            _ => return None,
        };
        value.as_deref()
    }
}

fn parse_finite(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// A (year, value) pair in one state's series for one indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// Equality query against the upstream dataset
///
/// Keys are upstream column names; keys starting with `$` are SoQL
/// parameters (e.g. `$limit`) passed through to the API unchanged. Backed by
/// a `BTreeMap` so the rendered cache key is independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    params: BTreeMap<String, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary field; empty values are ignored
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.params.insert(key.into(), value);
        }
        self
    }

    pub fn topic(self, topic: &str) -> Self {
        self.field("topic", topic)
    }

    pub fn question(self, question: &str) -> Self {
        self.field("question", question)
    }

    pub fn location(self, location: &str) -> Self {
        self.field("locationabbr", location)
    }

    pub fn year(self, year: i32) -> Self {
        self.field("yearstart", year)
    }

    pub fn stratification(self, stratification: &str) -> Self {
        self.field("stratification1", stratification)
    }

    pub fn overall(self) -> Self {
        self.stratification(OVERALL)
    }

    pub fn datasource(self, source: &str) -> Self {
        self.field("datasource", source)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.params {
            if !first {
                write!(f, "&")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}
