//! Text reports generated from weekly candles.
//!
//! This module provides:
//! - Prompt construction from a mode's series summary
//! - A chat-completion client with retry
//! - Keyword/report splitting of the reply (plus recovery for older stored reports)
//! - A JSON report store keyed by (city, mode)

pub mod client;
pub mod parse;
pub mod prompt;
pub mod store;

pub use store::{ReportStore, StoredReport};

use crate::kline::{build_kline, Mode};
use crate::weather::{find_city, WeatherStore, PROVINCE_CAPITALS};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use client::ChatClient;
use serde::Serialize;
use std::time::Duration;

/// Counts from a full generation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Everything one generation needs, opened once per batch.
struct Generator {
    client: ChatClient,
    weather: WeatherStore,
    reports: ReportStore,
}

impl Generator {
    fn open() -> Result<Self> {
        let config = &crate::config::get_config().report;
        let api_key = config.resolved_api_key().ok_or_else(|| {
            anyhow!(
                "Report API key is not configured (set report.api_key in config.json or {})",
                crate::config::API_KEY_ENV
            )
        })?;

        Ok(Self {
            client: ChatClient::new(config, api_key)?,
            weather: WeatherStore::open_default()?,
            reports: ReportStore::open_default(),
        })
    }

    fn generate(&self, city: &str, mode: Mode) -> Result<StoredReport> {
        let city = find_city(city).ok_or_else(|| anyhow!("Unknown city: {}", city))?;
        let days = self.weather.load_city(city.en)?;
        let output = build_kline(&days, mode);
        if output.candles.is_empty() {
            return Err(anyhow!("No kline data for {} ({})", city.en, mode));
        }

        let prompt = prompt::build_prompt(city.name, mode, &output.summary);
        let reply = self
            .client
            .complete(&prompt)
            .context(format!("Report request failed for {} ({})", city.en, mode))?;
        let parsed = parse::parse_response(&reply)?;

        crate::log(&format!(
            "Report generated for {} ({}): {} keywords, {} chars",
            city.en,
            mode,
            parsed.keywords.len(),
            parsed.report.chars().count()
        ));

        self.reports.upsert(city.en, city.name, mode, parsed, Utc::now())
    }
}

/// Generates and stores the report for one (city, mode).
pub fn generate_report(city: &str, mode: Mode) -> Result<StoredReport> {
    Generator::open()?.generate(city, mode)
}

/// Generates reports for every city and mode, pausing between cities.
/// Failures are logged and counted.
pub fn generate_all() -> Result<BatchReport> {
    let generator = Generator::open()?;
    let pause = Duration::from_millis(crate::config::get_config().report.pause_between_cities_ms);
    let mut batch = BatchReport::default();

    for (i, city) in PROVINCE_CAPITALS.iter().enumerate() {
        for mode in Mode::all() {
            batch.total += 1;
            match generator.generate(city.en, *mode) {
                Ok(_) => batch.success += 1,
                Err(e) => {
                    crate::log(&format!("Error: {} ({}) failed: {:#}", city.en, mode, e));
                    batch.failed += 1;
                }
            }
        }

        if i + 1 < PROVINCE_CAPITALS.len() {
            std::thread::sleep(pause);
        }
    }

    crate::log(&format!(
        "Batch generation done: {} total, {} ok, {} failed",
        batch.total, batch.success, batch.failed
    ));
    Ok(batch)
}

/// Stored report for (city, mode), recovering keywords from the text when missing.
pub fn get_report(city: &str, mode: Mode) -> Result<Option<StoredReport>> {
    let Some(mut stored) = ReportStore::open_default().get(city, mode)? else {
        return Ok(None);
    };

    if stored.keywords.is_empty() {
        let recovered = parse::extract_keywords_from_report(&stored.report)?;
        stored.keywords = recovered.keywords;
        stored.report = recovered.report;
    }
    Ok(Some(stored))
}
