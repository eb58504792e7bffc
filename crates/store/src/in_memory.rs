//! In-memory store: useful for testing and ephemeral runs.

use crate::city_key;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skywatch_core::error::StoreError;
use skywatch_core::observation::{CleanedRecord, Observation, StoredRecord, TemperatureStats};
use skywatch_core::store::WeatherStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps both tables in Vecs.
pub struct InMemoryStore {
    raw: Arc<RwLock<Vec<Observation>>>,
    cleaned: Arc<RwLock<Vec<StoredRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            raw: Arc::new(RwLock::new(Vec::new())),
            cleaned: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Insert one cleaned record with an explicit insertion time.
    pub async fn insert_cleaned_at(&self, record: &CleanedRecord, created_at: DateTime<Utc>) {
        let mut cleaned = self.cleaned.write().await;
        let id = cleaned.len() as i64 + 1;
        cleaned.push(StoredRecord {
            id,
            record: record.clone(),
            created_at,
        });
    }

    /// Matching records, newest first.
    async fn matching(&self, city: &str, since: Option<DateTime<Utc>>) -> Vec<StoredRecord> {
        let needle = city_key(city);
        let cleaned = self.cleaned.read().await;
        let mut hits: Vec<StoredRecord> = cleaned
            .iter()
            .filter(|r| city_key(&r.record.city_name).contains(&needle))
            .filter(|r| since.is_none_or(|s| r.created_at >= s))
            .cloned()
            .collect();
        newest_first(&mut hits);
        hits
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(records: &mut [StoredRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl WeatherStore for InMemoryStore {
    async fn insert_raw_batch(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        self.raw.write().await.extend_from_slice(observations);
        Ok(observations.len())
    }

    async fn insert_cleaned_batch(&self, records: &[CleanedRecord]) -> Result<usize, StoreError> {
        let created_at = Utc::now();
        for record in records {
            self.insert_cleaned_at(record, created_at).await;
        }
        Ok(records.len())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError> {
        let mut all = self.cleaned.read().await.clone();
        newest_first(&mut all);
        all.truncate(limit);
        Ok(all)
    }

    async fn latest_for_city(&self, city: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.matching(city, None).await.into_iter().next())
    }

    async fn history(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.matching(city, Some(since)).await)
    }

    async fn temperature_stats(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<TemperatureStats, StoreError> {
        let hits = self.matching(city, Some(since)).await;
        Ok(TemperatureStats::from_temperatures(
            hits.iter().map(|r| r.record.temperature),
        ))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.cleaned.read().await.len() as u64)
    }

    async fn raw_count(&self) -> Result<u64, StoreError> {
        Ok(self.raw.read().await.len() as u64)
    }
}
