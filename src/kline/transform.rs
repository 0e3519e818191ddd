//! Mode transforms: weekly base aggregates -> candlestick quadruples.
//!
//! Each mode implements [`WeekTransform`]. The transform is picked once per
//! batch and then evaluated for every week index against a shared,
//! read-only [`TransformContext`].

use super::aggregate::{max_of, min_of, WeeklyBase};
use super::calendar::WeekKey;
use super::global_stats::GlobalStats;
use super::mode::Mode;
use chrono::NaiveDate;
use serde::Serialize;

/// Placeholder candle for weeks without enough history.
const NO_HISTORY: Quadruple = Quadruple {
    open: 0.0,
    close: 0.0,
    high: 5.0,
    low: -5.0,
};

/// Padding added around open/close by the derived modes.
const CUMULATIVE_HIGH_PAD: f64 = 2.0;
const CUMULATIVE_LOW_PAD: f64 = 1.0;
const BAND_PAD: f64 = 2.0;

/// (open, close, high, low) for one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadruple {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

/// One output candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandlestickWeek {
    pub week: WeekKey,
    /// First date of the week
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl CandlestickWeek {
    fn new(base: &WeeklyBase, q: Quadruple) -> Self {
        Self {
            week: base.key,
            date: base.first_date(),
            open: q.open,
            close: q.close,
            high: q.high,
            low: q.low,
        }
    }

    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    pub fn is_down(&self) -> bool {
        self.close < self.open
    }

    pub fn change(&self) -> f64 {
        self.close - self.open
    }
}

/// Read-only inputs shared by every week of a batch.
pub struct TransformContext<'a> {
    pub weeks: &'a [WeeklyBase],
    pub stats: GlobalStats,
    /// `anomaly_prefix[i]` = sum of (week_avg - yearly_avg) over weeks `< i`
    anomaly_prefix: Vec<f64>,
}

impl<'a> TransformContext<'a> {
    pub fn new(weeks: &'a [WeeklyBase], stats: GlobalStats) -> Self {
        let mut anomaly_prefix = Vec::with_capacity(weeks.len() + 1);
        let mut running = 0.0;
        anomaly_prefix.push(running);
        for week in weeks {
            running += week.week_avg - stats.yearly_avg;
            anomaly_prefix.push(running);
        }

        Self {
            weeks,
            stats,
            anomaly_prefix,
        }
    }

    fn z(&self, value: f64) -> f64 {
        (value - self.stats.yearly_avg) / self.stats.yearly_std
    }
}

/// Computes one week's quadruple.
pub trait WeekTransform {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple;
}

/// Boundary daily minimums; weekly extremes.
pub struct Original;

/// Boundary daily ranges; range extremes.
pub struct DiurnalRange;

/// Daily temperatures standardized by the yearly stats.
pub struct ZScore;

/// Running sum of weekly anomalies.
pub struct Cumulative;

/// Second difference of weekly averages.
pub struct Acceleration;

/// Percent change against the previous week's average.
pub struct WeekChange;

impl WeekTransform for Original {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        let week = &ctx.weeks[index];
        Quadruple {
            open: week.temp_min[0],
            close: week.temp_min[week.temp_min.len() - 1],
            high: week.max_temp_max(),
            low: week.min_temp_min(),
        }
    }
}

impl WeekTransform for DiurnalRange {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        let ranges = &ctx.weeks[index].ranges;
        Quadruple {
            open: ranges[0],
            close: ranges[ranges.len() - 1],
            high: max_of(ranges),
            low: min_of(ranges),
        }
    }
}

impl WeekTransform for ZScore {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        let week = &ctx.weeks[index];
        let max_scores: Vec<f64> = week.temp_max.iter().map(|&t| ctx.z(t)).collect();
        let min_scores: Vec<f64> = week.temp_min.iter().map(|&t| ctx.z(t)).collect();
        Quadruple {
            open: max_scores[0],
            close: max_scores[max_scores.len() - 1],
            high: max_of(&max_scores),
            low: min_of(&min_scores),
        }
    }
}

impl WeekTransform for Cumulative {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        let open = ctx.anomaly_prefix[index];
        let close = ctx.anomaly_prefix[index + 1];
        Quadruple {
            open,
            close,
            high: close + CUMULATIVE_HIGH_PAD,
            low: open - CUMULATIVE_LOW_PAD,
        }
    }
}

impl WeekTransform for Acceleration {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        if index < 2 {
            return NO_HISTORY;
        }

        let before = ctx.weeks[index - 2].week_avg;
        let previous = ctx.weeks[index - 1].week_avg;
        let current = ctx.weeks[index].week_avg;

        let first_change = previous - before;
        let second_change = current - previous;
        let acceleration = second_change - first_change;

        let top = first_change.max(second_change);
        let bottom = first_change.min(second_change);

        Quadruple {
            open: first_change,
            close: second_change,
            high: if acceleration > 0.0 {
                top + acceleration.abs()
            } else {
                top + BAND_PAD
            },
            low: if acceleration < 0.0 {
                bottom - acceleration.abs()
            } else {
                bottom - BAND_PAD
            },
        }
    }
}

impl WeekTransform for WeekChange {
    fn compute_week(&self, index: usize, ctx: &TransformContext<'_>) -> Quadruple {
        if index == 0 {
            return NO_HISTORY;
        }

        let week = &ctx.weeks[index];
        let previous_avg = ctx.weeks[index - 1].week_avg;
        let percent = |value: f64| (value - previous_avg) / previous_avg * 100.0;
        let change_rate = percent(week.week_avg);

        Quadruple {
            open: percent(week.first_day_avg()),
            close: percent(week.last_day_avg()),
            high: change_rate + BAND_PAD,
            low: change_rate - BAND_PAD,
        }
    }
}

impl Mode {
    /// The transform implementing this mode.
    pub fn transform(&self) -> &'static dyn WeekTransform {
        match self {
            Mode::Original => &Original,
            Mode::ZScore => &ZScore,
            Mode::Range => &DiurnalRange,
            Mode::Cumulative => &Cumulative,
            Mode::Acceleration => &Acceleration,
            Mode::WeekChange => &WeekChange,
        }
    }
}

/// Produces one candle per week, in week order.
pub fn compute_candles(weeks: &[WeeklyBase], stats: GlobalStats, mode: Mode) -> Vec<CandlestickWeek> {
    let transform = mode.transform();
    let ctx = TransformContext::new(weeks, stats);

    weeks
        .iter()
        .enumerate()
        .map(|(index, base)| CandlestickWeek::new(base, transform.compute_week(index, &ctx)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kline::partition::WeekBucket;

    /// Builds a base week from (max, min) pairs starting on the given day of June 2025.
    fn week(n: u32, pairs: &[(i32, i32)]) -> WeeklyBase {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() + chrono::Days::new(n as u64 * 7);
        WeeklyBase::from_bucket(
            WeekKey::new(2025, 20 + n),
            WeekBucket {
                dates: (0..pairs.len())
                    .map(|i| start + chrono::Days::new(i as u64))
                    .collect(),
                temp_max: pairs.iter().map(|p| p.0).collect(),
                temp_min: pairs.iter().map(|p| p.1).collect(),
            },
        )
    }

    /// Week whose average is exactly `avg` (single day, max = min = avg).
    fn flat_week(n: u32, avg: i32) -> WeeklyBase {
        week(n, &[(avg, avg)])
    }

    fn stats(avg: f64, std: f64) -> GlobalStats {
        GlobalStats {
            yearly_avg: avg,
            yearly_std: std,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    const SAMPLE_WEEK: &[(i32, i32)] = &[(10, 0), (12, 2), (9, -1), (15, 3), (14, 2), (11, 1), (10, 0)];

    #[test]
    fn test_original_sample_week() {
        let weeks = vec![week(0, SAMPLE_WEEK)];
        let candles = compute_candles(&weeks, stats(6.0, 4.0), Mode::Original);
        assert_eq!(candles.len(), 1);
        let c = candles[0];
        assert_eq!((c.open, c.close, c.high, c.low), (0.0, 0.0, 15.0, -1.0));
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_original_extremes_bound_open_close() {
        let weeks = vec![
            week(0, SAMPLE_WEEK),
            week(1, &[(20, 11), (25, 18), (19, 9)]),
            week(2, &[(-3, -10)]),
        ];
        for c in compute_candles(&weeks, stats(0.0, 1.0), Mode::Original) {
            assert!(c.high >= c.open.max(c.close));
            assert!(c.low <= c.open.min(c.close));
        }
    }

    #[test]
    fn test_range_mode() {
        let weeks = vec![week(0, &[(10, 0), (12, 8), (20, 2), (9, 4)])];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::Range)[0];
        assert_eq!((c.open, c.close, c.high, c.low), (10.0, 5.0, 18.0, 4.0));
    }

    #[test]
    fn test_zscore_mode() {
        let weeks = vec![week(0, &[(12, 0), (16, 4), (14, -2)])];
        let c = compute_candles(&weeks, stats(8.0, 2.0), Mode::ZScore)[0];
        assert_close(c.open, 2.0);
        assert_close(c.close, 3.0);
        assert_close(c.high, 4.0);
        // Low comes from the minimums: (-2 - 8) / 2
        assert_close(c.low, -5.0);
    }

    #[test]
    fn test_zscore_zero_std_is_non_finite() {
        let weeks = vec![week(0, &[(5, 5)])];
        let c = compute_candles(&weeks, stats(5.0, 0.0), Mode::ZScore)[0];
        // (5 - 5) / 0
        assert!(c.open.is_nan());
        let weeks = vec![week(0, &[(7, 5)])];
        let c = compute_candles(&weeks, stats(5.0, 0.0), Mode::ZScore)[0];
        assert!(c.high.is_infinite());
    }

    #[test]
    fn test_zscore_constant_series_is_nan_not_inverted() {
        let weeks = vec![week(0, &[(5, 5), (5, 5), (5, 5)])];
        let c = compute_candles(&weeks, stats(5.0, 0.0), Mode::ZScore)[0];
        assert!(c.open.is_nan());
        assert!(c.close.is_nan());
        assert!(c.high.is_nan());
        assert!(c.low.is_nan());

        // A NaN day mixed with infinite days still yields NaN extremes
        let weeks = vec![week(0, &[(5, 5), (7, 3)])];
        let c = compute_candles(&weeks, stats(5.0, 0.0), Mode::ZScore)[0];
        assert!(c.high.is_nan());
        assert!(c.low.is_nan());
    }

    #[test]
    fn test_cumulative_mode() {
        let weeks = vec![flat_week(0, 12), flat_week(1, 8), flat_week(2, 13)];
        let candles = compute_candles(&weeks, stats(10.0, 1.0), Mode::Cumulative);

        assert_eq!((candles[0].open, candles[0].close), (0.0, 2.0));
        assert_eq!((candles[0].high, candles[0].low), (4.0, -1.0));
        assert_eq!((candles[1].open, candles[1].close), (2.0, 0.0));
        assert_eq!((candles[2].open, candles[2].close), (0.0, 3.0));
        assert_eq!((candles[2].high, candles[2].low), (5.0, -1.0));
    }

    #[test]
    fn test_cumulative_telescopes() {
        let weeks: Vec<WeeklyBase> = [3, 7, -2, 11, 5, 0, 9]
            .iter()
            .enumerate()
            .map(|(i, &avg)| flat_week(i as u32, avg))
            .collect();
        let s = stats(4.5, 1.0);
        let candles = compute_candles(&weeks, s, Mode::Cumulative);

        let total: f64 = weeks.iter().map(|w| w.week_avg - s.yearly_avg).sum();
        assert_close(candles.last().unwrap().close, total);
        for pair in candles.windows(2) {
            assert_close(pair[1].open, pair[0].close);
        }
    }

    #[test]
    fn test_acceleration_first_two_weeks() {
        let weeks = vec![flat_week(0, 1), flat_week(1, 9), flat_week(2, 4)];
        let candles = compute_candles(&weeks, stats(0.0, 1.0), Mode::Acceleration);
        for c in &candles[..2] {
            assert_eq!((c.open, c.close, c.high, c.low), (0.0, 0.0, 5.0, -5.0));
        }
    }

    #[test]
    fn test_acceleration_negative() {
        // changes: +8 then -5, acceleration -13
        let weeks = vec![flat_week(0, 1), flat_week(1, 9), flat_week(2, 4)];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::Acceleration)[2];
        assert_eq!((c.open, c.close), (8.0, -5.0));
        assert_eq!(c.high, 10.0);
        assert_eq!(c.low, -18.0);
    }

    #[test]
    fn test_acceleration_positive() {
        // changes: +1 then +4, acceleration +3
        let weeks = vec![flat_week(0, 0), flat_week(1, 1), flat_week(2, 5)];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::Acceleration)[2];
        assert_eq!((c.open, c.close), (1.0, 4.0));
        assert_eq!(c.high, 7.0);
        assert_eq!(c.low, -1.0);
    }

    #[test]
    fn test_acceleration_zero() {
        let weeks = vec![flat_week(0, 0), flat_week(1, 2), flat_week(2, 4)];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::Acceleration)[2];
        assert_eq!((c.open, c.close, c.high, c.low), (2.0, 2.0, 4.0, 0.0));
    }

    #[test]
    fn test_week_change_first_week() {
        let weeks = vec![week(0, SAMPLE_WEEK)];
        let c = compute_candles(&weeks, stats(6.0, 4.0), Mode::WeekChange)[0];
        assert_eq!((c.open, c.close, c.high, c.low), (0.0, 0.0, 5.0, -5.0));
    }

    #[test]
    fn test_week_change_percentages() {
        // Previous week average 10; current days average 11 and 12, week avg (14 + 8) / 2 = 11
        let weeks = vec![flat_week(0, 10), week(1, &[(14, 8), (14, 10)])];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::WeekChange)[1];
        assert_close(c.open, 10.0);
        assert_close(c.close, 20.0);
        assert_close(c.high, 12.0);
        assert_close(c.low, 8.0);
    }

    #[test]
    fn test_week_change_zero_previous_average() {
        let weeks = vec![flat_week(0, 0), flat_week(1, 3)];
        let c = compute_candles(&weeks, stats(0.0, 1.0), Mode::WeekChange)[1];
        assert!(c.open.is_infinite());
        assert!(c.high.is_infinite());
    }

    #[test]
    fn test_every_mode_handles_single_day() {
        let weeks = vec![week(0, &[(7, 3)])];
        for mode in Mode::all() {
            let candles = compute_candles(&weeks, stats(5.0, 1.0), *mode);
            assert_eq!(candles.len(), 1, "mode {}", mode);
        }
    }

    #[test]
    fn test_up_down_classification() {
        let weeks = vec![week(0, &[(10, 1), (10, 4)]), week(1, &[(10, 4), (10, 1)]), week(2, &[(10, 2)])];
        let candles = compute_candles(&weeks, stats(0.0, 1.0), Mode::Original);
        assert!(candles[0].is_up());
        assert!(candles[1].is_down());
        assert!(!candles[2].is_up() && !candles[2].is_down());
        assert_eq!(candles[0].change(), 3.0);
    }
}
