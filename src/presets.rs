//! Named date windows relative to "now"
//!
//! The table is computed once when built and never changes afterwards.

use crate::error::{Error, Result};
use crate::types::DateRange;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named window ending at the moment the preset table was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    /// Last 30 days
    #[value(name = "last_30d")]
    Last30d,
    /// Last 7 days
    #[value(name = "last_7d")]
    Last7d,
    /// Last 24 hours
    #[value(name = "last_24h")]
    Last24h,
    /// Last 7 days
    #[value(name = "last_week")]
    LastWeek,
    /// Last 24 hours
    #[value(name = "yesterday")]
    Yesterday,
}

impl DatePreset {
    /// Every preset, in table order
    pub const ALL: [DatePreset; 5] = [
        DatePreset::Last30d,
        DatePreset::Last7d,
        DatePreset::Last24h,
        DatePreset::LastWeek,
        DatePreset::Yesterday,
    ];

    /// Preset name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            DatePreset::Last30d => "last_30d",
            DatePreset::Last7d => "last_7d",
            DatePreset::Last24h => "last_24h",
            DatePreset::LastWeek => "last_week",
            DatePreset::Yesterday => "yesterday",
        }
    }

    /// How far back the window reaches
    pub fn lookback(self) -> Duration {
        match self {
            DatePreset::Last30d => Duration::days(30),
            DatePreset::Last7d | DatePreset::LastWeek => Duration::days(7),
            DatePreset::Last24h | DatePreset::Yesterday => Duration::days(1),
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DatePreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::invalid_value("date_preset", format!("unknown preset '{s}'")))
    }
}

/// Preset name to (start, end) table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePresets {
    generated_at: DateTime<Utc>,
    // Indexed by `DatePreset as usize`, same order as `DatePreset::ALL`
    ranges: [DateRange; 5],
}

impl DatePresets {
    /// Build the table relative to the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Build the table relative to `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        let ranges = DatePreset::ALL.map(|preset| DateRange::trailing(now, preset.lookback()));
        Self {
            generated_at: now,
            ranges,
        }
    }

    /// Window for a preset
    pub fn get(&self, preset: DatePreset) -> DateRange {
        self.ranges[preset as usize]
    }

    /// Window for a preset given by name
    pub fn get_by_name(&self, name: &str) -> Result<DateRange> {
        Ok(self.get(name.parse()?))
    }

    /// All (preset, window) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (DatePreset, DateRange)> + '_ {
        DatePreset::ALL.into_iter().zip(self.ranges.iter().copied())
    }

    /// When the table was computed
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

impl Default for DatePresets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_presets_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let presets = DatePresets::at(now);

        let r = presets.get(DatePreset::Last30d);
        assert_eq!(r.end(), now);
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap());

        let r = presets.get(DatePreset::Last7d);
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap());
        assert_eq!(presets.get(DatePreset::LastWeek), r);

        let r = presets.get(DatePreset::Last24h);
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2024, 5, 9, 12, 0, 0).unwrap());
        assert_eq!(presets.get(DatePreset::Yesterday), r);
    }

    #[test]
    fn test_every_preset_is_ordered() {
        let presets = DatePresets::new();
        assert_eq!(presets.iter().count(), DatePreset::ALL.len());
        for (preset, range) in presets.iter() {
            assert!(range.start() <= range.end(), "{preset} has start after end");
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in DatePreset::ALL {
            assert_eq!(preset.name().parse::<DatePreset>().unwrap(), preset);
        }
        assert!("last_year".parse::<DatePreset>().is_err());
        assert!("LAST_7D".parse::<DatePreset>().is_err());
    }

    #[test]
    fn test_get_by_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let presets = DatePresets::at(now);
        let range = presets.get_by_name("last_7d").unwrap();
        assert_eq!(range.start(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(presets.get_by_name("nope").is_err());
    }
}
