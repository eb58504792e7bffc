//! Argument parsing shared by the weather tools.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use skywatch_core::error::ToolError;

pub const DEFAULT_DAYS: i64 = 7;
pub const MAX_DAYS: i64 = 365;

/// Deserialize tool arguments into `T`. Anything that is not a JSON object
/// matching `T` exactly is rejected.
pub fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    if !arguments.is_object() {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".into(),
        ));
    }
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Trim a city argument, rejecting blanks.
pub fn city(raw: &str) -> Result<&str, ToolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments("city_name must not be empty".into()));
    }
    Ok(trimmed)
}

/// Validate a look-back window: at least one day, clamped to a year.
pub fn days(days: i64) -> Result<i64, ToolError> {
    if days < 1 {
        return Err(ToolError::InvalidArguments(format!(
            "days must be at least 1, got {days}"
        )));
    }
    Ok(days.min(MAX_DAYS))
}

pub(crate) fn default_days() -> i64 {
    DEFAULT_DAYS
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CityArgs {
    pub city_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WindowArgs {
    pub city_name: String,
    #[serde(default = "default_days")]
    pub days: i64,
}

pub(crate) fn format_time(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_defaults_to_a_week() {
        let args: WindowArgs = parse(json!({"city_name": "Galle"})).unwrap();
        assert_eq!(args.days, 7);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse::<CityArgs>(json!({"city_name": "Galle", "units": "metric"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(parse::<CityArgs>(json!(["Galle"])).is_err());
        assert!(parse::<CityArgs>(json!("Galle")).is_err());
    }

    #[test]
    fn days_bounds() {
        assert!(days(0).is_err());
        assert!(days(-3).is_err());
        assert_eq!(days(1).unwrap(), 1);
        assert_eq!(days(10_000).unwrap(), 365);
    }

    #[test]
    fn blank_city_is_rejected() {
        assert!(city("   ").is_err());
        assert_eq!(city("  Colombo ").unwrap(), "Colombo");
    }
}
