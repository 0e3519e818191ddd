//! Daily temperature observation, the input unit of the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's max/min temperature for a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub temp_max: i32,
    pub temp_min: i32,
}

impl DailyObservation {
    pub fn new(date: NaiveDate, temp_max: i32, temp_min: i32) -> Self {
        Self {
            date,
            temp_max,
            temp_min,
        }
    }

    /// Mean of the day's max and min.
    pub fn mean(&self) -> f64 {
        (self.temp_max as f64 + self.temp_min as f64) / 2.0
    }
}
