//! Whole-series summary of a candlestick sequence.

use super::aggregate::{max_of, min_of};
use super::mode::Mode;
use super::transform::CandlestickWeek;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// First and last candle dates, as ISO strings (empty when there are no candles).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Counts, extrema and mean change over all candles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Weeks with close > open
    pub up_weeks: usize,
    /// Weeks with close < open
    pub down_weeks: usize,
    /// Mean of (close - open)
    pub avg_change: f64,
    pub max_high: f64,
    pub min_low: f64,
    pub total_weeks: usize,
    pub date_range: DateRange,
}

impl SeriesSummary {
    /// Reduces a candle sequence. An empty sequence yields the all-zero summary.
    pub fn from_candles(candles: &[CandlestickWeek]) -> Self {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return SeriesSummary::default();
        };

        let total_change: f64 = candles.iter().map(CandlestickWeek::change).sum();

        SeriesSummary {
            up_weeks: candles.iter().filter(|c| c.is_up()).count(),
            down_weeks: candles.iter().filter(|c| c.is_down()).count(),
            avg_change: total_change / candles.len() as f64,
            max_high: max_of(&candles.iter().map(|c| c.high).collect::<Vec<_>>()),
            min_low: min_of(&candles.iter().map(|c| c.low).collect::<Vec<_>>()),
            total_weeks: candles.len(),
            date_range: DateRange {
                start: first.date.to_string(),
                end: last.date.to_string(),
            },
        }
    }

    /// Difference between the highest high and the lowest low.
    pub fn spread(&self) -> f64 {
        self.max_high - self.min_low
    }

    /// Year of the first candle, if any.
    pub fn year(&self) -> Option<i32> {
        self.date_range
            .start
            .parse::<NaiveDate>()
            .ok()
            .map(|date| date.year())
    }

    /// Range rendered as `Y/M/D - Y/M/D`; empty when there are no candles.
    pub fn display_range(&self) -> String {
        match (
            self.date_range.start.parse::<NaiveDate>(),
            self.date_range.end.parse::<NaiveDate>(),
        ) {
            (Ok(start), Ok(end)) => format!("{} - {}", slash_date(start), slash_date(end)),
            _ => String::new(),
        }
    }

    /// Human-readable values with the mode's unit attached.
    pub fn display(&self, mode: Mode) -> SummaryDisplay {
        let unit = mode.info().unit;
        SummaryDisplay {
            up_weeks: self.up_weeks,
            down_weeks: self.down_weeks,
            max_high: format!("{:.1}{}", self.max_high, unit),
            min_low: format!("{:.1}{}", self.min_low, unit),
            avg_change: format!("{:.2}{}", self.avg_change, unit),
            total_weeks: self.total_weeks,
            date_range: self.display_range(),
        }
    }
}

/// Formatted summary for terminal output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    pub up_weeks: usize,
    pub down_weeks: usize,
    pub max_high: String,
    pub min_low: String,
    pub avg_change: String,
    pub total_weeks: usize,
    pub date_range: String,
}

fn slash_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}
