//! Batch sync of the city catalogue into the observation store.
//!
//! Each call processes one slice `[start, start + count)` of the catalogue so a
//! caller can resume from `next_start_index`. Per-city failures are recorded in
//! the outcome and do not stop the batch.

use super::cities::{City, PROVINCE_CAPITALS};
use super::fetch::WeatherClient;
use super::store::WeatherStore;
use crate::kline::DailyObservation;
use anyhow::Result;
use serde::Serialize;
use std::ops::Range;

/// One city that failed to sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub city: String,
    pub error: String,
}

/// Result of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub start_index: usize,
    pub end_index: usize,
    pub total: usize,
    /// Share of the catalogue covered after this batch, rounded
    pub progress_percent: u32,
    pub success_count: usize,
    pub fail_count: usize,
    /// Where the next batch starts; None once the catalogue is done
    pub next_start_index: Option<usize>,
    pub errors: Vec<SyncFailure>,
}

impl SyncOutcome {
    pub fn is_finished(&self) -> bool {
        self.next_start_index.is_none()
    }
}

/// Catalogue slice for a batch, clamped to `total`.
pub fn batch_range(start: usize, count: usize, total: usize) -> Range<usize> {
    let start = start.min(total);
    let end = start.saturating_add(count).min(total);
    start..end
}

/// `end / total` as a rounded percentage; an empty catalogue counts as done.
pub fn progress_percent(end: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (end as f64 / total as f64 * 100.0).round() as u32
}

/// Syncs a slice of `cities`, fetching each with `fetch` and saving into `store`.
pub fn sync_cities<F>(
    cities: &[City],
    start: usize,
    count: usize,
    store: &WeatherStore,
    mut fetch: F,
) -> SyncOutcome
where
    F: FnMut(&City) -> Result<Vec<DailyObservation>>,
{
    let total = cities.len();
    let range = batch_range(start, count, total);
    let batch = &cities[range.clone()];

    crate::log(&format!(
        "Syncing cities {}-{} of {}: {}",
        range.start + 1,
        range.end,
        total,
        batch.iter().map(|c| c.en).collect::<Vec<_>>().join(", ")
    ));

    let mut success_count = 0;
    let mut errors = Vec::new();

    for city in batch {
        let result = fetch(city).and_then(|days| {
            crate::log(&format!("Fetched {} days for {}", days.len(), city.en));
            store.save_city(city.en, &days)
        });

        match result {
            Ok(()) => {
                crate::log(&format!("{} synced", city.en));
                success_count += 1;
            }
            Err(e) => {
                crate::log(&format!("Error: {} sync failed: {:#}", city.en, e));
                errors.push(SyncFailure {
                    city: city.en.to_string(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    let outcome = SyncOutcome {
        start_index: range.start,
        end_index: range.end,
        total,
        progress_percent: progress_percent(range.end, total),
        success_count,
        fail_count: errors.len(),
        next_start_index: (range.end < total).then_some(range.end),
        errors,
    };

    crate::log(&format!(
        "Batch done: {} ok, {} failed, progress {}% ({}/{})",
        outcome.success_count, outcome.fail_count, outcome.progress_percent, range.end, total
    ));

    outcome
}

/// Syncs one batch of the provincial capitals with the configured source and store.
///
/// `count` defaults to the configured batch size.
pub fn sync_batch(start: usize, count: Option<usize>) -> Result<SyncOutcome> {
    let config = &crate::config::get_config().weather;
    let client = WeatherClient::new(config)?;
    let store = WeatherStore::open_default()?;
    let count = count.unwrap_or(config.batch_size);

    Ok(sync_cities(PROVINCE_CAPITALS, start, count, &store, |city| {
        Ok(client.fetch_city(city)?)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn one_day() -> Vec<DailyObservation> {
        vec![DailyObservation::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 3, -8)]
    }

    #[test]
    fn test_batch_range() {
        assert_eq!(batch_range(0, 3, 32), 0..3);
        assert_eq!(batch_range(30, 3, 32), 30..32);
        assert_eq!(batch_range(40, 3, 32), 32..32);
        assert_eq!(batch_range(5, usize::MAX, 32), 5..32);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(3, 32), 9);
        assert_eq!(progress_percent(16, 32), 50);
        assert_eq!(progress_percent(32, 32), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_sync_collects_failures() {
        let dir = tempdir().unwrap();
        let store = WeatherStore::new(dir.path()).unwrap();

        let outcome = sync_cities(PROVINCE_CAPITALS, 0, 3, &store, |city| {
            if city.en == "Shanghai" {
                Err(anyhow!("HTTP 500"))
            } else {
                Ok(one_day())
            }
        });

        assert_eq!(outcome.start_index, 0);
        assert_eq!(outcome.end_index, 3);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.fail_count, 1);
        assert_eq!(outcome.errors[0].city, "Shanghai");
        assert_eq!(outcome.next_start_index, Some(3));
        assert_eq!(store.load_city("Beijing").unwrap(), one_day());
        assert!(store.load_city("Shanghai").unwrap().is_empty());
    }

    #[test]
    fn test_last_batch_finishes() {
        let dir = tempdir().unwrap();
        let store = WeatherStore::new(dir.path()).unwrap();
        let total = PROVINCE_CAPITALS.len();

        let outcome = sync_cities(PROVINCE_CAPITALS, total - 2, 3, &store, |_| Ok(one_day()));

        assert_eq!(outcome.end_index, total);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.progress_percent, 100);
        assert!(outcome.is_finished());
    }
}
