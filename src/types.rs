//! Common types used throughout crm-extract
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type. Keys keep insertion order.
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record: field name to value, in column order
pub type Record = JsonObject;

// ============================================================================
// Conditions
// ============================================================================

/// Equality/membership filters, keyed by field name.
///
/// Iteration follows insertion order, which is also the order the
/// `IN (...)` clauses appear in the generated query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    entries: Vec<(String, Vec<String>)>,
}

impl Conditions {
    /// Create an empty condition set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field filter. An existing field keeps its position and gets the new values.
    pub fn insert<I, S>(&mut self, field: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((field, values)),
        }
    }

    /// Builder form of [`Conditions::insert`]
    #[must_use]
    pub fn with<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(field, values);
        self
    }

    /// Allowed values for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterate over (field, values) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of fields filtered on
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no filters are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `Field=v1,v2` expression as used on the command line
    pub fn parse_expr(expr: &str) -> Result<(String, Vec<String>)> {
        let (field, values) = expr
            .split_once('=')
            .ok_or_else(|| Error::invalid_value("where", format!("expected FIELD=v1,v2: {expr}")))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(Error::invalid_value("where", format!("empty field name: {expr}")));
        }
        let values = values.split(',').map(|v| v.trim().to_string()).collect();
        Ok((field.to_string(), values))
    }
}

impl<K, V, S> FromIterator<(K, V)> for Conditions
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut conditions = Self::new();
        for (field, values) in iter {
            conditions.insert(field, values);
        }
        conditions
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// Closed timestamp interval used to filter on last-modified time.
///
/// Always has `start <= end`, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting an end that precedes the start
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_value(
                "date_range",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from RFC 3339 strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Window ending at `end` and reaching back `lookback`
    pub(crate) fn trailing(end: DateTime<Utc>, lookback: chrono::Duration) -> Self {
        Self {
            start: end - lookback.abs(),
            end,
        }
    }

    /// Inclusive lower bound
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive upper bound
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }
    Err(Error::invalid_value(
        "timestamp",
        format!("cannot parse '{s}' as RFC 3339 or YYYY-MM-DD"),
    ))
}

// ============================================================================
// Bulk API 2.0 Options
// ============================================================================

/// Column delimiter for Bulk API 2.0 result files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnDelimiter {
    #[default]
    Comma,
    Tab,
    Semicolon,
    Pipe,
    Caret,
    Backquote,
}

impl ColumnDelimiter {
    /// The byte separating columns
    pub fn as_byte(self) -> u8 {
        match self {
            ColumnDelimiter::Comma => b',',
            ColumnDelimiter::Tab => b'\t',
            ColumnDelimiter::Semicolon => b';',
            ColumnDelimiter::Pipe => b'|',
            ColumnDelimiter::Caret => b'^',
            ColumnDelimiter::Backquote => b'`',
        }
    }
}

/// Line ending for Bulk API 2.0 result files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}
