//! Analytical modes and their display metadata.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six candlestick transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "zscore")]
    ZScore,
    #[serde(rename = "range")]
    Range,
    #[serde(rename = "cumulative")]
    Cumulative,
    #[serde(rename = "acceleration")]
    Acceleration,
    #[serde(rename = "weekChange")]
    WeekChange,
}

/// Static description of a mode, used for summaries and report prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    pub label: &'static str,
    pub unit: &'static str,
    pub meaning: &'static str,
    /// What a report for this mode should focus on
    pub analysis: &'static str,
    pub description: &'static str,
}

impl Mode {
    /// Returns all modes in menu order.
    pub fn all() -> &'static [Mode] {
        &[
            Mode::Original,
            Mode::ZScore,
            Mode::Range,
            Mode::Cumulative,
            Mode::Acceleration,
            Mode::WeekChange,
        ]
    }

    /// Wire identifier, e.g. `weekChange`.
    pub fn id(&self) -> &'static str {
        match self {
            Mode::Original => "original",
            Mode::ZScore => "zscore",
            Mode::Range => "range",
            Mode::Cumulative => "cumulative",
            Mode::Acceleration => "acceleration",
            Mode::WeekChange => "weekChange",
        }
    }

    pub fn info(&self) -> ModeInfo {
        match self {
            Mode::Original => ModeInfo {
                label: "Raw temperature",
                unit: "°C",
                meaning: "actual temperature values",
                analysis: "seasonal shifts, temperature swings, cold snaps and heat waves",
                description: "Open/close are the first/last daily minimum of the week, high/low the weekly extremes",
            },
            Mode::ZScore => ModeInfo {
                label: "Z-score",
                unit: "σ",
                meaning: "standardized value (0 is the yearly average)",
                analysis: "anomalous weeks, distance from the average, extreme weather",
                description: "Daily temperatures standardized against the yearly mean and standard deviation",
            },
            Mode::Range => ModeInfo {
                label: "Diurnal range",
                unit: "°C",
                meaning: "difference between daily maximum and minimum",
                analysis: "weather stability, day/night swings, dressing for the day",
                description: "Daily max minus daily min; long candles mean unsettled weeks",
            },
            Mode::Cumulative => ModeInfo {
                label: "Cumulative anomaly",
                unit: "°C",
                meaning: "running sum of weekly deviations from the yearly average",
                analysis: "yearly trend, warm/cold phase changes, persistent warm or cold spells",
                description: "Weekly averages minus the yearly average, accumulated week by week",
            },
            Mode::Acceleration => ModeInfo {
                label: "Temperature acceleration",
                unit: "°C",
                meaning: "rate of change of the weekly temperature change",
                analysis: "speed of change, turning points, accelerating warming or cooling",
                description: "Second difference of weekly averages",
            },
            Mode::WeekChange => ModeInfo {
                label: "Week-over-week change",
                unit: "%",
                meaning: "percent change against the previous week's average",
                analysis: "rhythm of change, sudden jumps and drops between weeks",
                description: "Daily averages expressed as percent change from the previous week",
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Mode::all()
            .iter()
            .copied()
            .find(|mode| mode.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Mode::all().iter().map(Mode::id).collect();
                anyhow!("Unknown mode '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_ids() {
        for mode in Mode::all() {
            assert_eq!(mode.id().parse::<Mode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WEEKCHANGE".parse::<Mode>().unwrap(), Mode::WeekChange);
        assert_eq!("ZScore".parse::<Mode>().unwrap(), Mode::ZScore);
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "volume".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("weekChange"));
    }

    #[test]
    fn test_serde_uses_ids() {
        assert_eq!(serde_json::to_string(&Mode::WeekChange).unwrap(), "\"weekChange\"");
        let mode: Mode = serde_json::from_str("\"zscore\"").unwrap();
        assert_eq!(mode, Mode::ZScore);
    }

    #[test]
    fn test_units() {
        assert_eq!(Mode::ZScore.info().unit, "σ");
        assert_eq!(Mode::WeekChange.info().unit, "%");
        assert_eq!(Mode::Range.info().unit, "°C");
    }
}
