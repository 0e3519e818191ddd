//! Groups daily observations by week key.

use super::calendar::{week_key_of, WeekKey};
use super::observation::DailyObservation;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Raw per-week columns, in the order the days were encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekBucket {
    pub dates: Vec<NaiveDate>,
    pub temp_max: Vec<i32>,
    pub temp_min: Vec<i32>,
}

impl WeekBucket {
    fn push(&mut self, day: &DailyObservation) {
        self.dates.push(day.date);
        self.temp_max.push(day.temp_max);
        self.temp_min.push(day.temp_min);
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Partitions a date-sorted series into week buckets.
///
/// The map iterates in numeric week order. Within a bucket, days keep their
/// input order; if the input is not sorted by date the first/last entries
/// are positional, not chronological.
pub fn partition_by_week(days: &[DailyObservation]) -> BTreeMap<WeekKey, WeekBucket> {
    let mut buckets: BTreeMap<WeekKey, WeekBucket> = BTreeMap::new();
    for day in days {
        buckets.entry(week_key_of(day.date)).or_default().push(day);
    }
    buckets
}
