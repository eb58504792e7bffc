//! Weather query tools for SkyWatch.
//!
//! Four tools read the cleaned store; `get_live_weather` bypasses it and asks
//! the weather provider directly. Every tool reports lookups as a typed
//! [`Outcome`] rendered to JSON for the model.

pub mod args;
pub mod average_temperature;
pub mod compare_cities;
pub mod current_weather;
pub mod live_weather;
pub mod outcome;
pub mod weather_history;

pub use outcome::Outcome;

use skywatch_core::store::WeatherStore;
use skywatch_core::tool::ToolRegistry;
use skywatch_core::weather::WeatherSource;
use std::sync::Arc;

/// Build the registry handed to the model, in fixed catalog order.
pub fn weather_registry(
    store: Arc<dyn WeatherStore>,
    source: Arc<dyn WeatherSource>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(current_weather::CurrentWeatherTool::new(
        store.clone(),
    )));
    registry.register(Box::new(weather_history::WeatherHistoryTool::new(
        store.clone(),
    )));
    registry.register(Box::new(average_temperature::AverageTemperatureTool::new(
        store.clone(),
    )));
    registry.register(Box::new(compare_cities::CompareCitiesTool::new(store)));
    registry.register(Box::new(live_weather::LiveWeatherTool::new(source)));
    registry
}
