//! Whole-series statistics of daily mean temperature.

use super::observation::DailyObservation;
use serde::Serialize;

/// Yearly mean and population standard deviation of the daily means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub yearly_avg: f64,
    pub yearly_std: f64,
}

impl GlobalStats {
    /// Computes the stats over every supplied day.
    ///
    /// An empty slice yields NaN for both fields; callers guard against
    /// empty batches before running any transform.
    pub fn compute(days: &[DailyObservation]) -> Self {
        let count = days.len() as f64;
        let yearly_avg = days.iter().map(DailyObservation::mean).sum::<f64>() / count;

        // Population variance (divisor N)
        let variance = days
            .iter()
            .map(|day| {
                let diff = day.mean() - yearly_avg;
                diff * diff
            })
            .sum::<f64>()
            / count;

        GlobalStats {
            yearly_avg,
            yearly_std: variance.sqrt(),
        }
    }
}
