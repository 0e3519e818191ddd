//! Per-city CSV storage of daily observations.
//!
//! One file per city under `<data_dir>/weather/<City>.csv`:
//! date,temp_max,temp_min

use crate::kline::DailyObservation;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "date,temp_max,temp_min";

/// Directory-backed observation store.
#[derive(Debug, Clone)]
pub struct WeatherStore {
    dir: PathBuf,
}

impl WeatherStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .context(format!("Failed to create weather directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Store under the configured data directory.
    pub fn open_default() -> Result<Self> {
        Self::new(crate::config::get_config().data_dir().join("weather"))
    }

    pub fn city_path(&self, city: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", city))
    }

    /// Replaces the city's stored series.
    pub fn save_city(&self, city: &str, days: &[DailyObservation]) -> Result<()> {
        let path = self.city_path(city);
        let file = File::create(&path).context(format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", HEADER)?;
        for day in days {
            writeln!(writer, "{},{},{}", day.date, day.temp_max, day.temp_min)?;
        }
        writer.flush().context("Failed to flush CSV file")?;
        Ok(())
    }

    /// Loads the city's series sorted by date. A city never synced yields an empty series.
    pub fn load_city(&self, city: &str) -> Result<Vec<DailyObservation>> {
        let path = self.city_path(city);
        if !path.exists() {
            return Ok(Vec::new());
        }
        load_csv(&path)
    }

    /// Cities that have a stored file, by file stem.
    pub fn stored_cities(&self) -> Result<Vec<String>> {
        let mut cities = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    cities.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        cities.sort();
        Ok(cities)
    }
}

/// Reads an observation CSV, skipping the header and any malformed rows (with warning log).
pub fn load_csv(path: &Path) -> Result<Vec<DailyObservation>> {
    let file = File::open(path).context(format!("Failed to open CSV file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut days = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.context("Failed to read line from CSV")?;

        if line_num == 0 || line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(day) => days.push(day),
            Err(e) => {
                crate::log(&format!(
                    "Warning: Skipping malformed CSV row {} in {}: {}",
                    line_num + 1,
                    path.display(),
                    e
                ));
            }
        }
    }

    days.sort_by_key(|day| day.date);
    Ok(days)
}

fn parse_line(line: &str) -> Result<DailyObservation> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(anyhow!("Expected 3 columns, got {}", parts.len()));
    }

    let date = parts[0]
        .parse::<NaiveDate>()
        .context(format!("Invalid date '{}'", parts[0]))?;
    let temp_max = parts[1].parse::<i32>().context("Invalid temp_max")?;
    let temp_min = parts[2].parse::<i32>().context("Invalid temp_min")?;

    Ok(DailyObservation::new(date, temp_max, temp_min))
}
