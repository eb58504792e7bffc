//! Pulls a city name out of a free-text question.

use regex::Regex;
use std::sync::LazyLock;

/// Tried in order; the first match wins.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"weather\s+in\s+([\w\s]+?)(?:[?.!]|$)",
        r"weather\s+(?:at|for)\s+([\w\s]+?)(?:[?.!]|$)",
        r"temperature\s+in\s+([\w\s]+?)(?:[?.!]|$)",
        r"conditions?\s+in\s+([\w\s]+?)(?:[?.!]|$)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract the city from phrases like "weather in X", "temperature in X" or
/// "conditions in X". Matching is case-insensitive; the result is
/// lower-cased and trimmed.
pub fn extract_city(query: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    PATTERNS.iter().find_map(|re| {
        re.captures(&lowered)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|city| !city.is_empty())
    })
}
