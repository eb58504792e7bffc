//! Subcommands, plus the wiring they share.

pub mod ask;
pub mod collect;
pub mod init_config;
pub mod serve;
pub mod status;

use skywatch_agent::AgentLoop;
use skywatch_config::AppConfig;
use skywatch_core::event::EventBus;
use skywatch_core::store::WeatherStore;
use skywatch_core::weather::WeatherSource;
use skywatch_pipeline::Pipeline;
use skywatch_providers::OpenAiCompatProvider;
use skywatch_store::SqliteStore;
use skywatch_weather::OpenWeatherClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Open the configured SQLite store and run migrations.
pub async fn open_store(config: &AppConfig) -> CliResult<Arc<dyn WeatherStore>> {
    let store = SqliteStore::new(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| format!("Failed to open store at {}: {e}", config.database.url))?;
    Ok(Arc::new(store))
}

pub fn weather_source(config: &AppConfig) -> CliResult<Arc<dyn WeatherSource>> {
    let client = OpenWeatherClient::new(
        &config.weather.base_url,
        config.require_weather_key()?,
        Duration::from_secs(config.weather.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

pub fn build_pipeline(
    config: &AppConfig,
    source: Arc<dyn WeatherSource>,
    store: Arc<dyn WeatherStore>,
    events: Arc<EventBus>,
) -> Pipeline {
    let cities = skywatch_weather::cities::resolve(&config.cities);
    Pipeline::new(source, store, cities).with_events(events)
}

pub fn build_agent(
    config: &AppConfig,
    store: Arc<dyn WeatherStore>,
    source: Arc<dyn WeatherSource>,
    events: Arc<EventBus>,
) -> CliResult<AgentLoop> {
    let provider = OpenAiCompatProvider::new(
        "openai",
        &config.llm.base_url,
        config.require_openai_key()?,
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    let tools = Arc::new(skywatch_tools::weather_registry(store, source));

    Ok(AgentLoop::new(
        Arc::new(provider),
        &config.llm.model,
        config.llm.temperature,
        tools,
        events,
    )
    .with_max_tool_rounds(config.agent.max_tool_rounds))
}
