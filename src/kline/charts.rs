//! Candlestick chart rendering using plotters.
//!
//! One PNG per (city, mode). Colours and size come from the `chart`
//! section of config.json.

use super::mode::Mode;
use super::transform::CandlestickWeek;
use crate::config::ChartConfig;
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::path::Path;

/// Candle body width in pixels.
const CANDLE_WIDTH: u32 = 7;

/// Fraction of the value range added above and below the plot.
const Y_PADDING: f64 = 0.05;

/// Lowest low and highest high among candles whose values are all finite.
fn value_bounds(candles: &[CandlestickWeek]) -> Option<(f64, f64)> {
    let finite: Vec<&CandlestickWeek> = candles.iter().filter(|c| is_finite(c)).collect();
    if finite.is_empty() {
        return None;
    }
    let low = finite.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = finite.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    Some((low, high))
}

fn is_finite(candle: &CandlestickWeek) -> bool {
    [candle.open, candle.close, candle.high, candle.low]
        .iter()
        .all(|v| v.is_finite())
}

fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Render the candles of one city/mode to a PNG file.
pub fn generate_candle_chart(
    city: &str,
    mode: Mode,
    candles: &[CandlestickWeek],
    output_path: &Path,
    config: &ChartConfig,
) -> Result<()> {
    let (low, high) =
        value_bounds(candles).ok_or_else(|| anyhow!("No finite candles to plot for {}", city))?;
    let padding = ((high - low) * Y_PADDING).max(1.0);
    let info = mode.info();

    let up_color = rgb(config.up_color);
    let down_color = rgb(config.down_color);
    let neutral_color = rgb(config.neutral_color);
    let grid_color = rgb(config.grid_color);

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .context("Failed to fill chart background")?;

    let title = format!("{} - {} ({})", city, info.label, info.unit);
    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", config.title_size))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-1i32..candles.len() as i32, (low - padding)..(high + padding))
        .context("Failed to build candlestick chart")?;

    let week_label = |x: &i32| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| candles.get(i))
            .map(|c| format!("W{}", c.week.week))
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Week")
        .y_desc(info.unit)
        .x_label_formatter(&week_label)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .light_line_style(grid_color)
        .bold_line_style(grid_color.mix(0.8))
        .draw()
        .context("Failed to draw mesh")?;

    chart.draw_series(
        candles
            .iter()
            .enumerate()
            .filter(|(_, c)| is_finite(c))
            .map(|(i, c)| {
                // Flat weeks use the neutral colour
                let loss_color = if c.is_down() { down_color } else { neutral_color };
                CandleStick::new(
                    i as i32,
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    up_color.filled(),
                    loss_color.filled(),
                    CANDLE_WIDTH,
                )
            }),
    )?;

    root.present().context("Failed to save chart")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kline::calendar::WeekKey;
    use chrono::NaiveDate;

    fn candle(open: f64, close: f64, high: f64, low: f64) -> CandlestickWeek {
        CandlestickWeek {
            week: WeekKey::new(2025, 1),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            open,
            close,
            high,
            low,
        }
    }

    #[test]
    fn test_value_bounds() {
        let candles = vec![candle(1.0, 2.0, 4.0, -3.0), candle(0.0, 1.0, 8.0, 0.0)];
        assert_eq!(value_bounds(&candles), Some((-3.0, 8.0)));
    }

    #[test]
    fn test_value_bounds_skips_non_finite() {
        let candles = vec![
            candle(f64::NAN, 2.0, f64::INFINITY, -3.0),
            candle(0.0, 1.0, 2.0, -1.0),
        ];
        assert_eq!(value_bounds(&candles), Some((-1.0, 2.0)));
    }

    #[test]
    fn test_value_bounds_empty() {
        assert_eq!(value_bounds(&[]), None);
        assert_eq!(value_bounds(&[candle(f64::NAN, 0.0, 0.0, 0.0)]), None);
    }

    #[test]
    fn test_chart_without_finite_candles_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let candles = vec![candle(f64::NAN, f64::NAN, f64::NAN, f64::NAN)];
        let result = generate_candle_chart("Lhasa", Mode::ZScore, &candles, &path, &ChartConfig::default());
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
