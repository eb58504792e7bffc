//! Validation and normalization of raw observations.
//!
//! Hard checks reject the record; the pressure check only drops the value.

use serde::{Deserialize, Serialize};
use skywatch_core::observation::{CleanedRecord, Observation};
use tracing::{info, warn};

pub const TEMP_RANGE: (f64, f64) = (-100.0, 60.0);
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
pub const WIND_SPEED_RANGE: (f64, f64) = (0.0, 150.0);
pub const PRESSURE_RANGE: (f64, f64) = (800.0, 1100.0);

/// Why an observation was rejected. Carries the offending value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("temperature {0:?} outside [-100, 60] °C")]
    Temperature(Option<f64>),

    #[error("humidity {0:?} outside [0, 100] %")]
    Humidity(Option<f64>),

    #[error("wind speed {0:?} outside [0, 150] m/s")]
    WindSpeed(Option<f64>),
}

impl Rejection {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Temperature(_) => "temperature",
            Self::Humidity(_) => "humidity",
            Self::WindSpeed(_) => "wind_speed",
        }
    }
}

/// Per-batch validation summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub quality_percentage: f64,
}

fn in_range(value: Option<f64>, (lo, hi): (f64, f64)) -> bool {
    // NaN fails both comparisons
    value.is_some_and(|v| v >= lo && v <= hi)
}

/// Check the hard predicates in order, without logging.
pub fn validate(obs: &Observation) -> Result<(), Rejection> {
    if !in_range(obs.temperature, TEMP_RANGE) {
        return Err(Rejection::Temperature(obs.temperature));
    }
    if !in_range(obs.humidity, HUMIDITY_RANGE) {
        return Err(Rejection::Humidity(obs.humidity));
    }
    if !in_range(obs.wind_speed, WIND_SPEED_RANGE) {
        return Err(Rejection::WindSpeed(obs.wind_speed));
    }
    Ok(())
}

/// Validate and normalize one observation.
pub fn clean(obs: &Observation) -> Result<CleanedRecord, Rejection> {
    let city_name = normalize_label(obs.city_name.as_deref(), "Unknown");

    // validate() guarantees these are present and in range
    let (temperature, humidity, wind_speed) = match validate(obs) {
        Ok(()) => (
            obs.temperature.unwrap_or_default(),
            obs.humidity.unwrap_or_default(),
            obs.wind_speed.unwrap_or_default(),
        ),
        Err(rejection) => {
            warn!(
                city = %city_name,
                field = rejection.field(),
                value = ?rejection_value(&rejection),
                "Rejecting observation"
            );
            return Err(rejection);
        }
    };

    let pressure = match obs.pressure {
        Some(p) if in_range(Some(p), PRESSURE_RANGE) => Some(p.trunc() as u16),
        Some(p) => {
            warn!(city = %city_name, pressure = p, "Dropping implausible pressure");
            None
        }
        None => None,
    };

    Ok(CleanedRecord {
        city_name,
        country: normalize_country(obs.country.as_deref()),
        temperature: round2(temperature),
        feels_like: round2(obs.feels_like.filter(|f| f.is_finite()).unwrap_or(temperature)),
        weather_condition: normalize_label(obs.weather_condition.as_deref(), "Unknown"),
        weather_description: normalize_label(obs.weather_description.as_deref(), ""),
        humidity: humidity.trunc() as u8,
        wind_speed: round2(wind_speed),
        pressure,
        observed_at: obs.observed_at.unwrap_or(obs.fetched_at),
        fetched_at: obs.fetched_at,
    })
}

fn rejection_value(rejection: &Rejection) -> Option<f64> {
    match rejection {
        Rejection::Temperature(v) | Rejection::Humidity(v) | Rejection::WindSpeed(v) => *v,
    }
}

/// Clean every observation, keeping order and dropping rejects.
pub fn clean_batch(observations: &[Observation]) -> Vec<CleanedRecord> {
    info!(records = observations.len(), "Cleaning batch");
    let cleaned: Vec<CleanedRecord> = observations.iter().filter_map(|o| clean(o).ok()).collect();
    info!(
        valid = cleaned.len(),
        invalid = observations.len() - cleaned.len(),
        "Cleaning complete"
    );
    cleaned
}

pub fn quality_report(observations: &[Observation]) -> QualityReport {
    if observations.is_empty() {
        return QualityReport::default();
    }

    let total = observations.len();
    let valid = observations.iter().filter(|o| validate(o).is_ok()).count();
    QualityReport {
        total_records: total,
        valid_records: valid,
        invalid_records: total - valid,
        quality_percentage: round2(valid as f64 / total as f64 * 100.0),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn normalize_label(raw: Option<&str>, missing: &str) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => title_case(s),
        _ => missing.to_string(),
    }
}

fn normalize_country(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_uppercase(),
        _ => "N/A".to_string(),
    }
}

/// Upper-case every letter that starts a run of letters, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn good(city: &str) -> Observation {
        Observation {
            city_name: Some(city.into()),
            country: Some("us".into()),
            temperature: Some(25.456),
            feels_like: Some(24.8),
            weather_condition: Some("clear".into()),
            weather_description: Some("clear sky".into()),
            humidity: Some(65.0),
            wind_speed: Some(5.2),
            pressure: Some(1013.0),
            observed_at: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn cleans_and_normalizes() {
        let obs = good("  new york ");
        let rec = clean(&obs).unwrap();
        assert_eq!(rec.city_name, "New York");
        assert_eq!(rec.country, "US");
        assert_eq!(rec.temperature, 25.46);
        assert_eq!(rec.feels_like, 24.8);
        assert_eq!(rec.weather_condition, "Clear");
        assert_eq!(rec.weather_description, "Clear Sky");
        assert_eq!(rec.humidity, 65);
        assert_eq!(rec.pressure, Some(1013));
        assert_eq!(rec.observed_at, obs.fetched_at);
    }

    #[test]
    fn rejects_in_predicate_order() {
        let mut obs = good("Invalid City");
        obs.temperature = Some(999.0);
        obs.humidity = Some(150.0);
        assert_eq!(clean(&obs), Err(Rejection::Temperature(Some(999.0))));

        obs.temperature = Some(10.0);
        assert_eq!(clean(&obs), Err(Rejection::Humidity(Some(150.0))));

        obs.humidity = Some(50.0);
        obs.wind_speed = Some(-1.0);
        assert_eq!(clean(&obs), Err(Rejection::WindSpeed(Some(-1.0))));
    }

    #[test]
    fn missing_or_nan_values_reject() {
        let mut obs = good("Lima");
        obs.temperature = None;
        assert_eq!(validate(&obs), Err(Rejection::Temperature(None)));

        let mut obs = good("Lima");
        obs.wind_speed = Some(f64::NAN);
        assert!(matches!(validate(&obs), Err(Rejection::WindSpeed(_))));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut obs = good("Vostok");
        obs.temperature = Some(-100.0);
        obs.humidity = Some(0.0);
        obs.wind_speed = Some(150.0);
        assert!(clean(&obs).is_ok());

        obs.temperature = Some(60.0);
        obs.humidity = Some(100.0);
        obs.wind_speed = Some(0.0);
        assert!(clean(&obs).is_ok());
    }

    #[test]
    fn bad_pressure_is_dropped_not_rejected() {
        let mut obs = good("Quito");
        obs.pressure = Some(500.0);
        let rec = clean(&obs).unwrap();
        assert!(rec.pressure.is_none());

        obs.pressure = None;
        assert!(clean(&obs).unwrap().pressure.is_none());
    }

    #[test]
    fn defaults_fill_missing_text_and_feels_like() {
        let mut obs = good("x");
        obs.city_name = Some("   ".into());
        obs.country = None;
        obs.weather_condition = None;
        obs.weather_description = None;
        obs.feels_like = None;
        let observed = Utc::now() - Duration::minutes(5);
        obs.observed_at = Some(observed);

        let rec = clean(&obs).unwrap();
        assert_eq!(rec.city_name, "Unknown");
        assert_eq!(rec.country, "N/A");
        assert_eq!(rec.weather_condition, "Unknown");
        assert_eq!(rec.weather_description, "");
        assert_eq!(rec.feels_like, rec.temperature);
        assert_eq!(rec.observed_at, observed);
    }

    #[test]
    fn humidity_and_pressure_truncate() {
        let mut obs = good("Accra");
        obs.humidity = Some(64.6);
        obs.pressure = Some(1012.9);
        let rec = clean(&obs).unwrap();
        assert_eq!(rec.humidity, 64);
        assert_eq!(rec.pressure, Some(1012));

        obs.humidity = Some(99.99);
        assert_eq!(clean(&obs).unwrap().humidity, 99);
    }

    #[test]
    fn title_case_rules() {
        assert_eq!(title_case("rio de janeiro"), "Rio De Janeiro");
        assert_eq!(title_case("SÃO PAULO"), "São Paulo");
        assert_eq!(title_case("o'hare"), "O'Hare");
        assert_eq!(title_case("dar es salaam"), "Dar Es Salaam");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = clean(&good("bUENOS aires")).unwrap();
        let again = Observation {
            city_name: Some(once.city_name.clone()),
            country: Some(once.country.clone()),
            temperature: Some(once.temperature),
            feels_like: Some(once.feels_like),
            weather_condition: Some(once.weather_condition.clone()),
            weather_description: Some(once.weather_description.clone()),
            humidity: Some(f64::from(once.humidity)),
            wind_speed: Some(once.wind_speed),
            pressure: once.pressure.map(f64::from),
            observed_at: Some(once.observed_at),
            fetched_at: once.fetched_at,
        };
        assert_eq!(clean(&again).unwrap(), once);
    }

    #[test]
    fn batch_keeps_order_and_drops_rejects() {
        let mut bad = good("nowhere");
        bad.temperature = Some(999.0);
        let batch = vec![good("oslo"), bad, good("rome")];

        let cleaned = clean_batch(&batch);
        let names: Vec<_> = cleaned.iter().map(|r| r.city_name.as_str()).collect();
        assert_eq!(names, vec!["Oslo", "Rome"]);
    }

    #[test]
    fn quality_report_counts() {
        let mut bad = good("nowhere");
        bad.humidity = None;
        let report = quality_report(&[good("a"), good("b"), bad]);
        assert_eq!(report.total_records, 3);
        assert_eq!(report.valid_records, 2);
        assert_eq!(report.invalid_records, 1);
        assert_eq!(report.quality_percentage, 66.67);
    }

    #[test]
    fn quality_report_empty_batch() {
        assert_eq!(quality_report(&[]), QualityReport::default());
    }
}
