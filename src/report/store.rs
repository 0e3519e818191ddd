//! JSON-file storage of generated reports, keyed by (city, mode).

use super::parse::ParsedReport;
use crate::kline::Mode;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of reports returned by [`ReportStore::list`].
pub const LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    /// English city key
    pub city: String,
    /// Native city name
    pub city_name: String,
    pub mode: Mode,
    pub report: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_reports: usize,
    pub total_cities: usize,
    pub total_modes: usize,
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `reports.json` under the configured data directory.
    pub fn open_default() -> Self {
        Self::new(crate::config::get_config().data_dir().join("reports.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored reports; a missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<StoredReport>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .context(format!("Failed to read report store: {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents)
            .context(format!("Failed to parse report store: {}", self.path.display()))
    }

    fn save_all(&self, reports: &[StoredReport]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
        fs::write(&self.path, json)
            .context(format!("Failed to write report store: {}", self.path.display()))?;
        Ok(())
    }

    /// Inserts or replaces the report for (city, mode). An update keeps `create_time`.
    pub fn upsert(
        &self,
        city: &str,
        city_name: &str,
        mode: Mode,
        parsed: ParsedReport,
        now: DateTime<Utc>,
    ) -> Result<StoredReport> {
        let mut reports = self.load_all()?;

        let stored = match reports.iter_mut().find(|r| r.city == city && r.mode == mode) {
            Some(existing) => {
                existing.report = parsed.report;
                existing.keywords = parsed.keywords;
                existing.update_time = now;
                existing.clone()
            }
            None => {
                let report = StoredReport {
                    city: city.to_string(),
                    city_name: city_name.to_string(),
                    mode,
                    report: parsed.report,
                    keywords: parsed.keywords,
                    create_time: now,
                    update_time: now,
                };
                reports.push(report.clone());
                report
            }
        };

        self.save_all(&reports)?;
        Ok(stored)
    }

    pub fn get(&self, city: &str, mode: Mode) -> Result<Option<StoredReport>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|r| r.city.eq_ignore_ascii_case(city) && r.mode == mode))
    }

    /// Most recently updated first, at most [`LIST_LIMIT`].
    pub fn list(&self) -> Result<Vec<StoredReport>> {
        let mut reports = self.load_all()?;
        reports.sort_by(|a, b| b.update_time.cmp(&a.update_time));
        reports.truncate(LIST_LIMIT);
        Ok(reports)
    }

    pub fn stats(&self) -> Result<ReportStats> {
        let reports = self.load_all()?;
        let cities: HashSet<&str> = reports.iter().map(|r| r.city.as_str()).collect();
        let modes: HashSet<Mode> = reports.iter().map(|r| r.mode).collect();

        Ok(ReportStats {
            total_reports: reports.len(),
            total_cities: cities.len(),
            total_modes: modes.len(),
        })
    }
}
