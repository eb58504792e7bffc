//! Typed tool outcomes and their JSON shape.
//!
//! Success serializes as `{"success": true, "data": …}`, failure as
//! `{"success": false, "error": "…", "fallback": "try_live"}` with the
//! `fallback` key present only when a hint is set.

use serde::Serialize;
use serde_json::{Value, json};
use skywatch_core::tool::{FallbackHint, ToolResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success {
        data: T,
    },
    Failure {
        reason: String,
        fallback_hint: Option<FallbackHint>,
    },
}

impl<T: Serialize> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
            fallback_hint: None,
        }
    }

    /// A failure the caller may recover from by asking the live provider.
    pub fn try_live(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
            fallback_hint: Some(FallbackHint::TryLive),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn fallback_hint(&self) -> Option<FallbackHint> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { fallback_hint, .. } => *fallback_hint,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Success { data } => match serde_json::to_value(data) {
                Ok(data) => json!({ "success": true, "data": data }),
                Err(e) => failure_json(&format!("Could not serialize result: {e}"), None),
            },
            Self::Failure {
                reason,
                fallback_hint,
            } => failure_json(reason, *fallback_hint),
        }
    }

    pub fn into_tool_result(self) -> ToolResult {
        let value = self.to_json();
        let success = value["success"].as_bool().unwrap_or(false);
        ToolResult {
            call_id: String::new(),
            success,
            output: value.to_string(),
            data: Some(value),
            fallback: self.fallback_hint(),
        }
    }
}

fn failure_json(reason: &str, hint: Option<FallbackHint>) -> Value {
    let mut value = json!({ "success": false, "error": reason });
    if let Some(hint) = hint {
        value["fallback"] = json!(hint);
    }
    value
}
