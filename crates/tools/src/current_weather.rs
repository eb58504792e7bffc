//! `get_current_weather`: the most recent stored record for a city.

use crate::args::{self, CityArgs};
use crate::outcome::Outcome;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skywatch_core::error::ToolError;
use skywatch_core::observation::StoredRecord;
use skywatch_core::store::WeatherStore;
use skywatch_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::{debug, error};

pub const NAME: &str = "get_current_weather";

/// The view of a stored record handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: Option<u16>,
    pub timestamp: String,
    /// Minutes since the record was stored
    pub data_age_minutes: i64,
}

impl From<&StoredRecord> for WeatherSnapshot {
    fn from(stored: &StoredRecord) -> Self {
        let r = &stored.record;
        Self {
            city: r.city_name.clone(),
            country: r.country.clone(),
            temperature: r.temperature,
            feels_like: r.feels_like,
            condition: r.weather_condition.clone(),
            description: r.weather_description.clone(),
            humidity: r.humidity,
            wind_speed: r.wind_speed,
            pressure: r.pressure,
            timestamp: args::format_time(r.observed_at),
            data_age_minutes: (Utc::now() - stored.created_at).num_minutes().max(0),
        }
    }
}

pub struct CurrentWeatherTool {
    store: Arc<dyn WeatherStore>,
}

impl CurrentWeatherTool {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }

    /// Look up one city. Misses and store errors both suggest a live fetch.
    pub async fn lookup(&self, city: &str) -> Outcome<WeatherSnapshot> {
        match self.store.latest_for_city(city).await {
            Ok(Some(stored)) => Outcome::success(WeatherSnapshot::from(&stored)),
            Ok(None) => {
                debug!(city, "No stored weather");
                Outcome::try_live(format!("No data found for {city}"))
            }
            Err(e) => {
                error!(city, error = %e, "Current weather lookup failed");
                Outcome::try_live(e.to_string())
            }
        }
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Get the most recent weather data for a specific city from the database"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city_name": {
                    "type": "string",
                    "description": "The name of the city (e.g., 'London', 'Colombo', 'Galle')"
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
