//! Weekly candlestick engine.
//!
//! This module provides:
//! - Week assignment and partitioning of daily observations
//! - Yearly mean / standard deviation of daily means
//! - Per-week base aggregates and the six mode transforms
//! - Whole-series summary statistics
//! - JSON export and PNG chart rendering of the result
//!
//! The engine itself is pure: [`build_kline`] performs no I/O and never fails.

pub mod aggregate;
pub mod calendar;
pub mod charts;
pub mod export;
pub mod global_stats;
pub mod mode;
pub mod observation;
pub mod partition;
pub mod summary;
pub mod transform;

pub use global_stats::GlobalStats;
pub use mode::Mode;
pub use observation::DailyObservation;
pub use summary::SeriesSummary;
pub use transform::CandlestickWeek;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::Path;

/// Candles for one (city, mode) plus their summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KlineOutput {
    pub candles: Vec<CandlestickWeek>,
    pub summary: SeriesSummary,
}

/// Converts a date-sorted daily series into weekly candles for `mode`.
///
/// Empty input yields no candles and a zeroed summary.
pub fn build_kline(days: &[DailyObservation], mode: Mode) -> KlineOutput {
    if days.is_empty() {
        return KlineOutput::default();
    }

    let stats = GlobalStats::compute(days);
    let weeks = aggregate::aggregate_weeks(partition::partition_by_week(days));
    let candles = transform::compute_candles(&weeks, stats, mode);
    let summary = SeriesSummary::from_candles(&candles);

    KlineOutput { candles, summary }
}

/// Runs the full pipeline for one city: load stored observations, build candles,
/// optionally export JSON and render a chart.
pub fn generate_kline(
    city: &str,
    mode: Mode,
    json_path: Option<&Path>,
    chart_path: Option<&Path>,
) -> Result<KlineOutput> {
    let store = crate::weather::WeatherStore::open_default()?;
    let days = store.load_city(city)?;
    if days.is_empty() {
        return Err(anyhow!("No weather data stored for {}", city));
    }

    crate::log(&format!("Loaded {} days for {}", days.len(), city));

    let output = build_kline(&days, mode);
    crate::log(&format!(
        "Built {} weekly candles ({})",
        output.candles.len(),
        mode.info().label
    ));

    if let Some(path) = json_path {
        export::export_to_json(city, mode, &output, path)?;
        crate::log(&format!("Kline JSON saved: {}", path.display()));
    }

    if let Some(path) = chart_path {
        let config = crate::config::get_config();
        charts::generate_candle_chart(city, mode, &output.candles, path, &config.chart)?;
        crate::log(&format!("Chart saved: {}", path.display()));
    }

    Ok(output)
}
