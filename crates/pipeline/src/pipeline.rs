//! One collection run: fetch, persist raw, clean, persist cleaned.

use crate::cleaner::{self, QualityReport};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skywatch_core::event::{DomainEvent, EventBus};
use skywatch_core::store::WeatherStore;
use skywatch_core::weather::WeatherSource;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Why a run stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The provider returned nothing for any city; nothing was written.
    NoObservations,
    /// Raw data was stored but every observation was rejected.
    NothingValid,
}

/// Operational summary of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    pub fetched: usize,
    pub raw_stored: usize,
    pub cleaned: usize,
    pub cleaned_stored: usize,
    pub quality: QualityReport,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

pub struct Pipeline {
    source: Arc<dyn WeatherSource>,
    store: Arc<dyn WeatherStore>,
    cities: Vec<String>,
    events: Option<Arc<EventBus>>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: Arc<dyn WeatherStore>,
        cities: Vec<String>,
    ) -> Self {
        Self {
            source,
            store,
            cities,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Execute the four steps in order. Never fails; problems are logged and
    /// show up as reduced counts in the report.
    pub async fn run(&self) -> PipelineReport {
        let started = Instant::now();
        let mut report = PipelineReport::default();
        info!(cities = self.cities.len(), "Pipeline run started");

        self.collect(&mut report).await;

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            duration_ms = report.duration_ms,
            fetched = report.fetched,
            raw_stored = report.raw_stored,
            cleaned = report.cleaned,
            cleaned_stored = report.cleaned_stored,
            quality = report.quality.quality_percentage,
            skipped = ?report.skipped,
            "Pipeline run finished"
        );

        if let Some(events) = &self.events {
            events.publish(DomainEvent::PipelineCompleted {
                fetched: report.fetched,
                raw_stored: report.raw_stored,
                cleaned: report.cleaned,
                cleaned_stored: report.cleaned_stored,
                quality_percentage: report.quality.quality_percentage,
                duration_ms: report.duration_ms,
                timestamp: Utc::now(),
            });
        }

        report
    }

    async fn collect(&self, report: &mut PipelineReport) {
        // Step 1: fetch
        let observations = self.source.fetch_cities(&self.cities).await;
        report.fetched = observations.len();
        if observations.is_empty() {
            warn!("No observations fetched, skipping run");
            report.skipped = Some(SkipReason::NoObservations);
            return;
        }

        // Step 2: persist raw
        report.raw_stored = match self.store.insert_raw_batch(&observations).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Failed to store raw observations");
                0
            }
        };

        // Step 3: clean
        let cleaned = cleaner::clean_batch(&observations);
        report.quality = cleaner::quality_report(&observations);
        report.cleaned = cleaned.len();
        info!(
            total = report.quality.total_records,
            valid = report.quality.valid_records,
            invalid = report.quality.invalid_records,
            quality = report.quality.quality_percentage,
            "Data quality"
        );
        if cleaned.is_empty() {
            warn!("No valid observations after cleaning, skipping cleaned insert");
            report.skipped = Some(SkipReason::NothingValid);
            return;
        }

        // Step 4: persist cleaned
        report.cleaned_stored = match self.store.insert_cleaned_batch(&cleaned).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Failed to store cleaned records");
                0
            }
        };
    }
}
