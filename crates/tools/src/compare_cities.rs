//! `compare_cities_weather`: current weather for several cities at once.

use crate::args;
use crate::current_weather::{CurrentWeatherTool, WeatherSnapshot};
use crate::outcome::Outcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skywatch_core::error::ToolError;
use skywatch_core::store::WeatherStore;
use skywatch_core::tool::{Tool, ToolResult};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompareArgs {
    city_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityComparison {
    pub cities_compared: usize,
    pub cities: Vec<WeatherSnapshot>,
    /// Requested cities with no stored data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

pub struct CompareCitiesTool {
    current: CurrentWeatherTool,
}

impl CompareCitiesTool {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self {
            current: CurrentWeatherTool::new(store),
        }
    }

    async fn compare(&self, cities: &[&str]) -> Outcome<CityComparison> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for city in cities {
            match self.current.lookup(city).await {
                Outcome::Success { data } => found.push(data),
                Outcome::Failure { .. } => missing.push(city.to_string()),
            }
        }

        if found.is_empty() {
            return Outcome::failure("Could not retrieve data for any of the specified cities");
        }
        Outcome::success(CityComparison {
            cities_compared: found.len(),
            cities: found,
            missing,
        })
    }
}

#[async_trait]
impl Tool for CompareCitiesTool {
    fn name(&self) -> &str {
        "compare_cities_weather"
    }

    fn description(&self) -> &str {
        "Compare current weather between multiple cities"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city_names": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of city names to compare"
                }
            },
            "required": ["city_names"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let parsed: CompareArgs = args::parse(arguments)?;
        let cities: Vec<&str> = parsed
            .city_names
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(self.compare(&cities).await.into_tool_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use serde_json::json;
    use skywatch_store::InMemoryStore;

    async fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_cleaned_batch(&[record("London", 12.0), record("Paris", 15.0)])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn keeps_successes_in_request_order() {
        let tool = CompareCitiesTool::new(store().await);
        let result = tool
            .execute(json!({"city_names": ["Paris", "Atlantis", "London"]}))
            .await
            .unwrap();
        assert!(result.success);

        let data = &result.data.unwrap()["data"];
        assert_eq!(data["cities_compared"], 2);
        assert_eq!(data["cities"][0]["city"], "Paris");
        assert_eq!(data["cities"][1]["city"], "London");
        assert_eq!(data["missing"], json!(["Atlantis"]));
    }

    #[tokio::test]
    async fn fails_only_when_every_city_fails() {
        let tool = CompareCitiesTool::new(store().await);
        let result = tool
            .execute(json!({"city_names": ["Atlantis", "El Dorado"]}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.fallback.is_none());
    }

    #[tokio::test]
    async fn empty_list_is_a_failure() {
        let tool = CompareCitiesTool::new(store().await);
        let result = tool.execute(json!({"city_names": []})).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn non_array_is_invalid() {
        let tool = CompareCitiesTool::new(store().await);
        let err = tool
            .execute(json!({"city_names": "London, Paris"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
