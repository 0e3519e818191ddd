//! Open-Meteo archive client.
//!
//! Requests daily max/min temperature for one city over the configured
//! date range and converts the columnar response into observations.

use super::cities::City;
use crate::config::WeatherConfig;
use crate::kline::DailyObservation;
use crate::retry::{check_status, retry_with_backoff, ApiError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Columnar daily block of the archive response.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyColumns {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveResponse {
    pub daily: DailyColumns,
}

/// Blocking HTTP client for the archive API.
pub struct WeatherClient {
    http: reqwest::blocking::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Fetches and converts one city's series, retrying per the configured policy.
    pub fn fetch_city(&self, city: &City) -> Result<Vec<DailyObservation>, ApiError> {
        let label = format!("Weather fetch for {}", city.en);
        let response = retry_with_backoff(&self.config.retry_policy(), &label, |_| {
            self.fetch_once(city)
        })?;
        Ok(to_observations(city, &response))
    }

    fn fetch_once(&self, city: &City) -> Result<ArchiveResponse, ApiError> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&archive_query(city, &self.config))
            .header("User-Agent", "weather-kline")
            .send()?;

        let status = response.status().as_u16();
        let body = check_status(status, response.text()?)?;
        parse_archive(&body)
    }
}

/// Query parameters for one city.
fn archive_query(city: &City, config: &WeatherConfig) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", city.lat.to_string()),
        ("longitude", city.lon.to_string()),
        ("start_date", config.start_date.clone()),
        ("end_date", config.end_date.clone()),
        ("daily", "temperature_2m_max,temperature_2m_min".to_string()),
        ("timezone", "auto".to_string()),
    ]
}

pub fn parse_archive(body: &str) -> Result<ArchiveResponse, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(format!("archive response: {}", e)))
}

/// Rounds half-up to the nearest integer (2.5 -> 3, -2.5 -> -2).
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Converts the columnar response into date-sorted observations.
///
/// Days with an unparsable date or a missing temperature are skipped.
pub fn to_observations(city: &City, response: &ArchiveResponse) -> Vec<DailyObservation> {
    let daily = &response.daily;
    let mut days = Vec::with_capacity(daily.time.len());

    for (i, date) in daily.time.iter().enumerate() {
        let max = daily.temperature_2m_max.get(i).copied().flatten();
        let min = daily.temperature_2m_min.get(i).copied().flatten();

        match (date.parse::<NaiveDate>(), max, min) {
            (Ok(date), Some(max), Some(min)) => {
                days.push(DailyObservation::new(date, round_half_up(max), round_half_up(min)));
            }
            _ => {
                crate::log(&format!("Warning: Skipping incomplete day {} for {}", date, city.en));
            }
        }
    }

    days.sort_by_key(|day| day.date);
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::cities::find_city;

    const SAMPLE: &str = r#"{
        "latitude": 39.9,
        "longitude": 116.4,
        "daily_units": { "time": "iso8601", "temperature_2m_max": "°C" },
        "daily": {
            "time": ["2025-01-01", "2025-01-02", "2025-01-03"],
            "temperature_2m_max": [2.5, -2.5, null],
            "temperature_2m_min": [-8.4, -10.6, -9.0]
        }
    }"#;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-8.4), -8);
        assert_eq!(round_half_up(-10.6), -11);
    }

    #[test]
    fn test_parse_and_convert() {
        let city = find_city("Beijing").unwrap();
        let response = parse_archive(SAMPLE).unwrap();
        let days = to_observations(city, &response);

        // The day with a missing max is dropped
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!((days[0].temp_max, days[0].temp_min), (3, -8));
        assert_eq!((days[1].temp_max, days[1].temp_min), (-2, -11));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_archive(r#"{"error": true, "reason": "bad range"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_archive_query() {
        let city = find_city("Lhasa").unwrap();
        let query = archive_query(city, &WeatherConfig::default());
        assert!(query.contains(&("latitude", "29.6525".to_string())));
        assert!(query.contains(&("start_date", "2025-01-01".to_string())));
        assert!(query.contains(&("timezone", "auto".to_string())));
    }
}
