//! Weather observation domain types.
//!
//! An [`Observation`] is what the weather provider returned, verbatim. A
//! [`CleanedRecord`] is what survives validation and normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw observation as captured from the weather provider.
///
/// Every measurement and text field is optional because the provider may
/// omit any of them. Out-of-range values are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub city_name: Option<String>,
    pub country: Option<String>,

    /// Degrees Celsius
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,

    /// Short condition label (e.g. "Clouds")
    pub weather_condition: Option<String>,

    /// Longer condition description (e.g. "broken clouds")
    pub weather_description: Option<String>,

    /// Percent
    pub humidity: Option<f64>,

    /// Metres per second
    pub wind_speed: Option<f64>,

    /// Hectopascals
    pub pressure: Option<f64>,

    /// Provider's observation timestamp
    pub observed_at: Option<DateTime<Utc>>,

    /// When we fetched it
    pub fetched_at: DateTime<Utc>,
}

impl Observation {
    /// An observation with only the city name set, fetched now.
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city_name: Some(city.into()),
            country: None,
            temperature: None,
            feels_like: None,
            weather_condition: None,
            weather_description: None,
            humidity: None,
            wind_speed: None,
            pressure: None,
            observed_at: None,
            fetched_at: Utc::now(),
        }
    }
}

/// A validated, normalized observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub city_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub weather_condition: String,
    pub weather_description: String,
    pub humidity: u8,
    pub wind_speed: f64,

    /// `None` when the provider omitted it or it fell outside the plausible range
    pub pressure: Option<u16>,
    pub observed_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

/// A cleaned record as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Store-assigned row id
    pub id: i64,

    #[serde(flatten)]
    pub record: CleanedRecord,

    /// Insertion time; all windowed lookups filter on this
    pub created_at: DateTime<Utc>,
}

/// Aggregate temperature figures over a window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub count: u64,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureStats {
    /// Fold a sequence of temperatures into stats.
    pub fn from_temperatures(temps: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        let mut sum = 0.0;
        for t in temps {
            stats.count += 1;
            sum += t;
            stats.min = Some(stats.min.map_or(t, |m| m.min(t)));
            stats.max = Some(stats.max.map_or(t, |m| m.max(t)));
        }
        if stats.count > 0 {
            stats.avg = Some(sum / stats.count as f64);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_from_empty_is_absent() {
        let stats = TemperatureStats::from_temperatures(Vec::new());
        assert_eq!(stats.count, 0);
        assert!(stats.avg.is_none());
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
    }

    #[test]
    fn stats_from_temperatures() {
        let stats = TemperatureStats::from_temperatures([10.0, 20.0, 30.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.avg, Some(20.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
    }

    #[test]
    fn stored_record_flattens_on_the_wire() {
        let now = Utc::now();
        let stored = StoredRecord {
            id: 3,
            record: CleanedRecord {
                city_name: "Oslo".into(),
                country: "NO".into(),
                temperature: 4.5,
                feels_like: 1.2,
                weather_condition: "Snow".into(),
                weather_description: "Light Snow".into(),
                humidity: 80,
                wind_speed: 3.1,
                pressure: None,
                observed_at: now,
                fetched_at: now,
            },
            created_at: now,
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["city_name"], "Oslo");
        assert_eq!(json["id"], 3);
        assert!(json["pressure"].is_null());
    }
}
