//! `get_average_temperature`: mean, min and max over a trailing window.

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
pub struct TemperatureSummary {
    pub city: String,
    pub period: String,
    pub average_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub data_points: u64,
}

pub struct AverageTemperatureTool {
    store: Arc<dyn WeatherStore>,
}

impl AverageTemperatureTool {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }

    async fn lookup(&self, city: &str, days: i64) -> Outcome<TemperatureSummary> {
        let since = Utc::now() - Duration::days(days);
        let stats = match self.store.temperature_stats(city, since).await {
            Ok(stats) => stats,
            Err(e) => {
                error!(city, days, error = %e, "Temperature stats failed");
                return Outcome::failure(e.to_string());
            }
        };

        match (stats.count, stats.avg, stats.min, stats.max) {
            (count, Some(avg), Some(min), Some(max)) if count > 0 => {
                Outcome::success(TemperatureSummary {
                    city: city.to_string(),
                    period: format!("last {days} days"),
                    average_temperature: round2(avg),
                    min_temperature: round2(min),
                    max_temperature: round2(max),
                    data_points: count,
                })
            }
            _ => Outcome::failure(format!("No data found for {city} in the last {days} days")),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[async_trait]
impl Tool for AverageTemperatureTool {
    fn name(&self) -> &str {
        "get_average_temperature"
    }

    fn description(&self) -> &str {
        "Calculate average temperature for a city over a specific time period"
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
                    "description": "Number of days to calculate average for",
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

    #[tokio::test]
    async fn summarizes_the_window() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        for (t, age) in [(20.0, 1), (22.0, 2), (25.0, 3), (5.0, 20)] {
            store
                .insert_cleaned_at(&record("Berlin", t), now - Duration::days(age))
                .await;
        }

        let tool = AverageTemperatureTool::new(store);
        let result = tool.execute(json!({"city_name": "Berlin"})).await.unwrap();
        assert!(result.success);

        let data = &result.data.unwrap()["data"];
        assert_eq!(data["average_temperature"], 22.33);
        assert_eq!(data["min_temperature"], 20.0);
        assert_eq!(data["max_temperature"], 25.0);
        assert_eq!(data["data_points"], 3);
        assert_eq!(data["period"], "last 7 days");
    }

    #[tokio::test]
    async fn no_rows_is_a_failure() {
        let tool = AverageTemperatureTool::new(Arc::new(InMemoryStore::new()));
        let result = tool
            .execute(json!({"city_name": "Berlin", "days": 1}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("No data found for Berlin in the last 1 days"));
    }

    #[tokio::test]
    async fn oversized_window_is_clamped() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_cleaned_batch(&[record("Oslo", 2.0)]).await.unwrap();
        let tool = AverageTemperatureTool::new(store);
        let result = tool
            .execute(json!({"city_name": "Oslo", "days": 5000}))
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["data"]["period"], "last 365 days");
    }
}
