//! WeatherStore trait: durable storage for raw and cleaned observations.
//!
//! Records are write-once. Reads are either "most recent N" or "within a
//! trailing window"; city filters match case-insensitively on a substring.

use crate::error::StoreError;
use crate::observation::{CleanedRecord, Observation, StoredRecord, TemperatureStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Append raw observations. Returns how many rows were written; a row
    /// that fails is logged and skipped without aborting the rest.
    async fn insert_raw_batch(&self, observations: &[Observation]) -> Result<usize, StoreError>;

    /// Append cleaned records, same contract as [`Self::insert_raw_batch`].
    async fn insert_cleaned_batch(&self, records: &[CleanedRecord]) -> Result<usize, StoreError>;

    /// The newest `limit` cleaned records across all cities.
    async fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError>;

    /// The newest cleaned record whose city contains `city`.
    async fn latest_for_city(&self, city: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Cleaned records for `city` created at or after `since`, newest first.
    async fn history(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Temperature aggregates for `city` over records created at or after `since`.
    async fn temperature_stats(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<TemperatureStats, StoreError>;

    /// Total cleaned records.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Total raw observations.
    async fn raw_count(&self) -> Result<u64, StoreError>;
}
