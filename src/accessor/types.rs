//! Record request types

use crate::presets::DatePreset;
use crate::types::{Conditions, DateRange};
use serde::{Deserialize, Serialize};

/// What [`RecordAccessor::get_records`](super::RecordAccessor::get_records) should fetch.
///
/// Empty field lists and empty condition sets count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Fields to select; the full schema when absent
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Membership filters
    #[serde(default)]
    pub conditions: Option<Conditions>,
    /// Named window; wins over `date_range`
    #[serde(default)]
    pub date_preset: Option<DatePreset>,
    /// Explicit window
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

impl RecordRequest {
    /// Request with nothing set (fetch everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Select these fields
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Filter on these conditions
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Use a named window
    #[must_use]
    pub fn with_preset(mut self, preset: DatePreset) -> Self {
        self.date_preset = Some(preset);
        self
    }

    /// Use an explicit window
    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Selected fields, if any were given
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref().filter(|f| !f.is_empty())
    }

    /// Conditions, if any were given
    pub fn conditions(&self) -> Option<&Conditions> {
        self.conditions.as_ref().filter(|c| !c.is_empty())
    }

    /// Whether no selector is set at all
    pub fn is_unfiltered(&self) -> bool {
        self.fields().is_none()
            && self.conditions().is_none()
            && self.date_preset.is_none()
            && self.date_range.is_none()
    }
}
