//! Daily temperature source and storage.
//!
//! - City catalogue (provincial capitals)
//! - Open-Meteo archive fetch with retry
//! - CSV observation store, one file per city
//! - Resumable batch sync over the catalogue

pub mod cities;
pub mod fetch;
pub mod store;
pub mod sync;

pub use cities::{find_city, PROVINCE_CAPITALS};
pub use store::WeatherStore;
pub use sync::sync_batch;
