//! OpenWeatherMap current-weather client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use skywatch_core::error::FetchError;
use skywatch_core::observation::Observation;
use skywatch_core::weather::WeatherSource;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches current conditions one city at a time.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetchError::NotConfigured("weather API key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn fetch_city(&self, city: &str) -> Result<Observation, FetchError> {
        debug!(city, "Fetching current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(city.to_string())
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        match status.as_u16() {
            404 => return Err(FetchError::NotFound(city.to_string())),
            401 => return Err(FetchError::Unauthorized),
            code if !status.is_success() => {
                warn!(city, status = code, "Weather provider returned error");
                return Err(FetchError::Api {
                    status: code,
                    message: truncate_body(&body),
                });
            }
            _ => {}
        }

        parse_observation(city, &body, Utc::now())
    }
}

/// Map a current-weather payload onto an [`Observation`].
///
/// The provider's `name` falls back to the requested city.
pub fn parse_observation(
    requested_city: &str,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Observation, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let main = parsed.main.unwrap_or_default();
    let condition = parsed.weather.into_iter().next().unwrap_or_default();

    Ok(Observation {
        city_name: Some(
            parsed
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| requested_city.to_string()),
        ),
        country: parsed.sys.and_then(|s| s.country),
        temperature: main.temp,
        feels_like: main.feels_like,
        weather_condition: condition.main,
        weather_description: condition.description,
        humidity: main.humidity,
        wind_speed: parsed.wind.and_then(|w| w.speed),
        pressure: main.pressure,
        observed_at: parsed.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
        fetched_at,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let mut s: String = body.chars().take(MAX).collect();
        s.push_str("...");
        s
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}
