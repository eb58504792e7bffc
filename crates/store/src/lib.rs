//! Store implementations for SkyWatch.
//!
//! Both backends implement `skywatch_core::WeatherStore`. Callers hold the
//! store as an explicitly passed `Arc<dyn WeatherStore>`.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Lower-cased form used for case-insensitive substring city matching.
pub(crate) fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}
