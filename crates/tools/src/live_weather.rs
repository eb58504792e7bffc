//! `get_live_weather`: ask the weather provider directly, bypassing the store.
//!
//! Values are passed through as the provider reported them, uncleaned.

use crate::args::{self, CityArgs};
use crate::outcome::Outcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skywatch_core::error::ToolError;
use skywatch_core::observation::Observation;
use skywatch_core::tool::{Tool, ToolResult};
use skywatch_core::weather::WeatherSource;
use std::sync::Arc;
use tracing::{info, warn};

pub const NAME: &str = "get_live_weather";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveWeather {
    pub source: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
    pub timestamp: String,
}

impl LiveWeather {
    fn from_observation(source: &str, obs: Observation) -> Self {
        Self {
            source: source.to_string(),
            city: obs.city_name,
            country: obs.country,
            temperature: obs.temperature,
            feels_like: obs.feels_like,
            condition: obs.weather_condition,
            description: obs.weather_description,
            humidity: obs.humidity,
            wind_speed: obs.wind_speed,
            pressure: obs.pressure,
            timestamp: args::format_time(obs.observed_at.unwrap_or(obs.fetched_at)),
        }
    }
}

pub struct LiveWeatherTool {
    source: Arc<dyn WeatherSource>,
}

impl LiveWeatherTool {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    pub async fn lookup(&self, city: &str) -> Outcome<LiveWeather> {
        info!(city, source = self.source.name(), "Fetching live weather");
        match self.source.fetch_city(city).await {
            Ok(obs) => Outcome::success(LiveWeather::from_observation(self.source.name(), obs)),
            Err(e) => {
                warn!(city, error = %e, "Live weather fetch failed");
                Outcome::failure(format!(
                    "Could not retrieve weather data for {city} from API: {e}"
                ))
            }
        }
    }
}

#[async_trait]
impl Tool for LiveWeatherTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Fallback: Get live weather data directly from OpenWeatherMap API if database query fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city_name": {
                    "type": "string",
                    "description": "The name of the city"
                }
            },
            "required": ["city_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let parsed: CityArgs = args::parse(arguments)?;
        let city = args::city(&parsed.city_name)?;
        Ok(self.lookup(city).await.into_tool_result())
    }
}
