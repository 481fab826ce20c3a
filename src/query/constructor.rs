//! SOQL query construction

use crate::types::{Conditions, DateRange};
use chrono::{DateTime, Utc};

/// Compound fields that SOQL cannot project directly
pub const COMPOUND_FIELDS: [&str; 3] = ["BillingAddress", "ShippingAddress", "Geolocation"];

/// Field the time-range clause filters on
pub const LAST_MODIFIED_FIELD: &str = "LastModifiedDate";

/// Timestamp layout used in time-range clauses
pub const SOQL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Inputs to query construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// Object to select from
    pub object: String,
    /// Fields to select, in order
    pub fields: Vec<String>,
    /// Membership filters
    pub conditions: Option<Conditions>,
    /// Last-modified window
    pub date_range: Option<DateRange>,
}

impl QuerySpec {
    /// Select `fields` from `object`
    pub fn new<I, S>(object: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object: object.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add membership filters
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Restrict to records modified within `range`
    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Render the SOQL string
    pub fn build(&self) -> String {
        let start = self.date_range.map(|r| r.start());
        let end = self.date_range.map(|r| r.end());
        build_query(
            &self.object,
            &self.fields,
            self.conditions.as_ref(),
            start,
            end,
        )
    }
}

/// Build `SELECT ... FROM <object> [WHERE ...]`.
///
/// The time clause is emitted only when both bounds are present and always
/// precedes the condition clauses. Condition values are wrapped in single
/// quotes verbatim; a value containing `'` produces an invalid query.
pub fn build_query<S: AsRef<str>>(
    object: &str,
    fields: &[S],
    conditions: Option<&Conditions>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> String {
    let select = select_clause(fields);
    match where_clause(conditions, start, end) {
        Some(filter) => format!("{select} FROM {object} WHERE {filter}"),
        None => format!("{select} FROM {object}"),
    }
}

/// `SELECT f1, f2, ...` without compound fields
pub fn select_clause<S: AsRef<str>>(fields: &[S]) -> String {
    let selected: Vec<&str> = fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| !COMPOUND_FIELDS.contains(f))
        .collect();
    format!("SELECT {}", selected.join(", "))
}

/// Filter expression without the `WHERE` keyword, or `None` when there is nothing to filter
pub fn where_clause(
    conditions: Option<&Conditions>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<String> {
    let mut clauses = Vec::new();

    if let (Some(start), Some(end)) = (start, end) {
        clauses.push(format!(
            "{LAST_MODIFIED_FIELD} >= '{}' AND {LAST_MODIFIED_FIELD} <= '{}'",
            format_datetime(start),
            format_datetime(end)
        ));
    }

    if let Some(conditions) = conditions {
        for (field, values) in conditions.iter() {
            let quoted: Vec<String> = values.iter().map(|v| format!("'{v}'")).collect();
            clauses.push(format!("{field} IN ({})", quoted.join(", ")));
        }
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.000Z`
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(SOQL_DATETIME_FORMAT).to_string()
}
