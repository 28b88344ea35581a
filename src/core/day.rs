//! Calendar Day Keys
//!
//! Maps an instant to the canonical UTC calendar day shared by all players.
//! The day key string (`YYYY-MM-DD`) is the only input to seed derivation,
//! so its formatting must never change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::hash::fnv1a_32;

/// Canonical calendar-day identifier.
///
/// Always derived from UTC date components, regardless of the observer's
/// local timezone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Day key for the UTC date containing `now`.
    pub fn from_instant(now: DateTime<Utc>) -> Self {
        Self(now.date_naive())
    }

    /// Day key for an explicit calendar date.
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day key from year/month/day components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following calendar day.
    pub fn next_day(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding calendar day.
    pub fn previous_day(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// True if `self` is exactly one calendar day after `other`.
    pub fn is_day_after(&self, other: &DayKey) -> bool {
        other.next_day() == Some(*self)
    }

    /// Deterministic 32-bit seed for this day (FNV-1a over the key string).
    pub fn seed(&self) -> u32 {
        fnv1a_32(&self.to_string())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Zero-padded so the seed input is stable.
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

/// Error parsing a day key string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid day key: {0}")]
pub struct DayKeyParseError(pub String);

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DayKeyParseError(s.to_string()))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
