//! Per-week base aggregates shared by every mode.

use super::calendar::WeekKey;
use super::partition::WeekBucket;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One week's daily columns plus derived reductions.
///
/// Every list holds at least one element.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyBase {
    pub key: WeekKey,
    pub dates: Vec<NaiveDate>,
    pub temp_max: Vec<f64>,
    pub temp_min: Vec<f64>,
    /// Daily max - min, aligned with `dates`
    pub ranges: Vec<f64>,
    /// (max of temp_max + min of temp_min) / 2
    pub week_avg: f64,
}

impl WeeklyBase {
    /// Builds the aggregate from a non-empty bucket.
    pub fn from_bucket(key: WeekKey, bucket: WeekBucket) -> Self {
        let temp_max: Vec<f64> = bucket.temp_max.iter().map(|&t| t as f64).collect();
        let temp_min: Vec<f64> = bucket.temp_min.iter().map(|&t| t as f64).collect();
        let ranges = temp_max
            .iter()
            .zip(&temp_min)
            .map(|(max, min)| max - min)
            .collect();
        let week_avg = (max_of(&temp_max) + min_of(&temp_min)) / 2.0;

        WeeklyBase {
            key,
            dates: bucket.dates,
            temp_max,
            temp_min,
            ranges,
            week_avg,
        }
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn max_temp_max(&self) -> f64 {
        max_of(&self.temp_max)
    }

    pub fn min_temp_min(&self) -> f64 {
        min_of(&self.temp_min)
    }

    /// Mean of max/min on the first day of the week.
    pub fn first_day_avg(&self) -> f64 {
        (self.temp_max[0] + self.temp_min[0]) / 2.0
    }

    /// Mean of max/min on the last day of the week.
    pub fn last_day_avg(&self) -> f64 {
        let last = self.dates.len() - 1;
        (self.temp_max[last] + self.temp_min[last]) / 2.0
    }
}

/// Converts partitioned buckets into the ordered base list.
pub fn aggregate_weeks(buckets: BTreeMap<WeekKey, WeekBucket>) -> Vec<WeeklyBase> {
    buckets
        .into_iter()
        .filter(|(_, bucket)| !bucket.is_empty())
        .map(|(key, bucket)| WeeklyBase::from_bucket(key, bucket))
        .collect()
}

/// Largest value; NaN if any value is NaN, NEG_INFINITY for an empty slice.
pub(crate) fn max_of(values: &[f64]) -> f64 {
    extreme(values, f64::NEG_INFINITY, f64::max)
}

/// Smallest value; NaN if any value is NaN, INFINITY for an empty slice.
pub(crate) fn min_of(values: &[f64]) -> f64 {
    extreme(values, f64::INFINITY, f64::min)
}

fn extreme(values: &[f64], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(init, pick)
}
