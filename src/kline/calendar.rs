//! Week assignment for daily observations.
//!
//! Week numbers follow a simple day-of-year heuristic rather than ISO-8601:
//! `week = ceil((day_of_week + 1 + days_since_jan1) / 7)` with Sunday = 0.
//! Dates near the year boundary may not match their true ISO week.

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

/// Year + week-number identifier, rendered as `"<year>-W<n>"`.
///
/// Ordering compares the year and then the week number numerically,
/// so `2025-W2` sorts before `2025-W10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{}", self.year, self.week)
    }
}

impl Serialize for WeekKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Maps a calendar date to its week key.
pub fn week_key_of(date: NaiveDate) -> WeekKey {
    let days_since_jan1 = date.ordinal0();
    let day_of_week = date.weekday().num_days_from_sunday();
    // Integer ceil of (dow + 1 + days) / 7
    let week = (day_of_week + 1 + days_since_jan1).div_ceil(7);
    WeekKey::new(date.year(), week)
}
