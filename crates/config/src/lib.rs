//! Configuration loading, validation, and management for SkyWatch.
//!
//! Loads configuration from `~/.skywatch/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// OpenWeatherMap current-weather endpoint.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// The root configuration structure.
///
/// Maps directly to `~/.skywatch/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Weather provider API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,

    /// Cities to collect. Empty means the built-in catalog.
    #[serde(default)]
    pub cities: Vec<String>,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("weather_api_key", &redact(&self.weather_api_key))
            .field("cities", &self.cities.len())
            .field("llm", &self.llm)
            .field("weather", &self.weather)
            .field("database", &self.database)
            .field("scheduler", &self.scheduler)
            .field("gateway", &self.gateway)
            .field("agent", &self.agent)
            .finish()
    }
}

/// Language-model service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    DEFAULT_WEATHER_BASE_URL.into()
}
fn default_weather_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://skywatch.db".into()
}
fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Run one collection immediately at startup
    #[serde(default = "default_true")]
    pub run_initial_fetch: bool,
}

/// One week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

fn default_interval_minutes() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            run_initial_fetch: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on model turns that request tools, per question
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_max_tool_rounds() -> usize {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (or the default location when `None`),
    /// then apply environment overrides and validate.
    ///
    /// Environment variables checked:
    /// - `SKYWATCH_OPENAI_API_KEY`, then `OPENAI_API_KEY`
    /// - `SKYWATCH_WEATHER_API_KEY`, then `OPENWEATHERMAP_API_KEY`
    /// - `SKYWATCH_LLM_BASE_URL`, `SKYWATCH_MODEL`, `WEATHER_API_BASE_URL`
    /// - `SKYWATCH_DATABASE_URL`
    /// - `FETCH_INTERVAL_MINUTES`, `RUN_INITIAL_FETCH`
    /// - `API_HOST`, `API_PORT`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// API keys from the environment only fill keys the file left empty;
    /// every other variable overrides the file.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.openai_api_key.is_none() {
            self.openai_api_key =
                non_empty("SKYWATCH_OPENAI_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"));
        }
        if self.weather_api_key.is_none() {
            self.weather_api_key = non_empty("SKYWATCH_WEATHER_API_KEY")
                .or_else(|| non_empty("OPENWEATHERMAP_API_KEY"));
        }

        if let Some(url) = non_empty("SKYWATCH_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty("SKYWATCH_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("WEATHER_API_BASE_URL") {
            self.weather.base_url = url;
        }
        if let Some(url) = non_empty("SKYWATCH_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(raw) = non_empty("FETCH_INTERVAL_MINUTES") {
            self.scheduler.interval_minutes = parse_env("FETCH_INTERVAL_MINUTES", &raw)?;
        }
        if let Some(raw) = non_empty("RUN_INITIAL_FETCH") {
            self.scheduler.run_initial_fetch = parse_bool("RUN_INITIAL_FETCH", &raw)?;
        }
        if let Some(host) = non_empty("API_HOST") {
            self.gateway.host = host;
        }
        if let Some(raw) = non_empty("API_PORT") {
            self.gateway.port = parse_env("API_PORT", &raw)?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skywatch")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.llm.timeout_secs == 0 || self.weather.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least 1 second".into(),
            ));
        }
        if self.scheduler.interval_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "scheduler.interval_minutes must be at least 1".into(),
            ));
        }
        if self.scheduler.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::ValidationError(format!(
                "scheduler.interval_minutes must be at most {MAX_INTERVAL_MINUTES}"
            )));
        }
        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_rounds must be at least 1".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The language-model key, or an error naming the variables to set.
    pub fn require_openai_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key.as_deref().ok_or(ConfigError::MissingKey {
            key: "openai_api_key",
            env: "OPENAI_API_KEY",
        })
    }

    /// The weather provider key, or an error naming the variables to set.
    pub fn require_weather_key(&self) -> Result<&str, ConfigError> {
        self.weather_api_key.as_deref().ok_or(ConfigError::MissingKey {
            key: "weather_api_key",
            env: "OPENWEATHERMAP_API_KEY",
        })
    }

    /// Generate a default config TOML string (for `init-config`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            weather_api_key: None,
            cities: vec![],
            llm: LlmConfig::default(),
            weather: WeatherConfig::default(),
            database: DatabaseConfig::default(),
            scheduler: SchedulerConfig::default(),
            gateway: GatewayConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Missing {key}; set it in the config file or via {env}")]
    MissingKey { key: &'static str, env: &'static str },
}
