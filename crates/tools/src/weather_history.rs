//! `get_weather_history`: stored records for a city in a trailing window.

use crate::args::{self, WindowArgs};
use crate::outcome::Outcome;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use skywatch_core::error::ToolError;
use skywatch_core::store::WeatherStore;
use skywatch_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherHistory {
    pub city: String,
    pub days: i64,
    pub record_count: usize,
    /// Newest first
    pub records: Vec<HistoryEntry>,
}

pub struct WeatherHistoryTool {
    store: Arc<dyn WeatherStore>,
}

impl WeatherHistoryTool {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }

    async fn lookup(&self, city: &str, days: i64) -> Outcome<WeatherHistory> {
        let since = Utc::now() - Duration::days(days);
        match self.store.history(city, since).await {
            Ok(rows) if rows.is_empty() => Outcome::failure(format!(
                "No historical data found for {city} in the last {days} days"
            )),
            Ok(rows) => Outcome::success(WeatherHistory {
                city: city.to_string(),
                days,
                record_count: rows.len(),
                records: rows
                    .iter()
                    .map(|r| HistoryEntry {
                        temperature: r.record.temperature,
                        humidity: r.record.humidity,
                        wind_speed: r.record.wind_speed,
                        condition: r.record.weather_condition.clone(),
                        time: args::format_time(r.created_at),
                    })
                    .collect(),
            }),
            Err(e) => {
                error!(city, days, error = %e, "History lookup failed");
                Outcome::failure(e.to_string())
            }
        }
    }
}

#[async_trait]
impl Tool for WeatherHistoryTool {
    fn name(&self) -> &str {
        "get_weather_history"
    }

    fn description(&self) -> &str {
        "Get historical weather data for a city within a specific time period"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city_name": {
                    "type": "string",
                    "description": "The name of the city"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days to look back (e.g., 7 for last week)",
                    "default": args::DEFAULT_DAYS
                }
            },
            "required": ["city_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let parsed: WindowArgs = args::parse(arguments)?;
        let city = args::city(&parsed.city_name)?;
        let days = args::days(parsed.days)?;
        Ok(self.lookup(city, days).await.into_tool_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use serde_json::json;
    use skywatch_store::InMemoryStore;

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_cleaned_at(&record("Galle", 27.0), now - Duration::days(10))
            .await;
        store
            .insert_cleaned_at(&record("Galle", 28.0), now - Duration::days(2))
            .await;
        store
            .insert_cleaned_at(&record("Galle", 30.0), now - Duration::hours(1))
            .await;
        store
    }

    #[tokio::test]
    async fn default_window_is_one_week_newest_first() {
        let tool = WeatherHistoryTool::new(seeded().await);
        let result = tool.execute(json!({"city_name": "Galle"})).await.unwrap();
        assert!(result.success);

        let data = &result.data.unwrap()["data"];
        assert_eq!(data["days"], 7);
        assert_eq!(data["record_count"], 2);
        assert_eq!(data["records"][0]["temperature"], 30.0);
        assert_eq!(data["records"][1]["temperature"], 28.0);
    }

    #[tokio::test]
    async fn wider_window_sees_older_rows() {
        let tool = WeatherHistoryTool::new(seeded().await);
        let result = tool
            .execute(json!({"city_name": "galle", "days": 30}))
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["data"]["record_count"], 3);
    }

    #[tokio::test]
    async fn empty_window_is_a_failure_without_fallback() {
        let tool = WeatherHistoryTool::new(seeded().await);
        let result = tool
            .execute(json!({"city_name": "Kandy", "days": 3}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.fallback.is_none());
        assert!(result.output.contains("in the last 3 days"));
    }

    #[tokio::test]
    async fn zero_days_is_invalid() {
        let tool = WeatherHistoryTool::new(seeded().await);
        let err = tool
            .execute(json!({"city_name": "Galle", "days": 0}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
