//! Turns one model-requested tool call into the text of a tool message.
//!
//! Nothing here fails: unknown tools, malformed arguments and tool errors
//! all become text the model can read and react to.

use chrono::Utc;
use serde_json::{Value, json};
use skywatch_core::event::{DomainEvent, EventBus};
use skywatch_core::message::MessageToolCall;
use skywatch_core::tool::{FallbackHint, ToolCall, ToolRegistry, ToolResult};
use skywatch_tools::{current_weather, live_weather};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
}

impl Dispatcher {
    pub fn new(tools: Arc<ToolRegistry>, event_bus: Arc<EventBus>) -> Self {
        Self { tools, event_bus }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute a call and return the tool message content.
    pub async fn dispatch(&self, tc: &MessageToolCall) -> String {
        if self.tools.get(&tc.name).is_none() {
            warn!(tool = %tc.name, "Model requested an unknown tool");
            return format!("Unknown tool: {}", tc.name);
        }

        let arguments = match parse_arguments(&tc.arguments) {
            Ok(arguments) => arguments,
            Err(message) => {
                warn!(tool = %tc.name, error = %message, "Unparseable tool arguments");
                self.publish_executed(&tc.name, false, 0);
                return format!("Error: {message}");
            }
        };

        info!(tool = %tc.name, arguments = %arguments, "Executing tool");
        let call = ToolCall {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments,
        };

        let stored = match self.execute(&call).await {
            Ok(result) => result,
            Err(message) => return format!("Error: {message}"),
        };

        if call.name == current_weather::NAME && stored.fallback == Some(FallbackHint::TryLive) {
            return self.fall_back_to_live(&call, stored).await;
        }
        stored.output
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, String> {
        let start = Instant::now();
        let result = self.tools.execute(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(result) => {
                debug!(tool = %call.name, success = result.success, duration_ms, "Tool finished");
                self.publish_executed(&call.name, result.success, duration_ms);
                Ok(result)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                self.publish_executed(&call.name, false, duration_ms);
                Err(e.to_string())
            }
        }
    }

    /// Run the live lookup for the same city and report both outcomes in
    /// one message.
    async fn fall_back_to_live(&self, call: &ToolCall, stored: ToolResult) -> String {
        let city = call.arguments["city_name"].as_str().unwrap_or_default();
        info!(city, "No usable stored data, falling back to live weather");
        self.event_bus.publish(DomainEvent::FallbackTriggered {
            city: city.to_string(),
            timestamp: Utc::now(),
        });

        let live_call = ToolCall {
            id: call.id.clone(),
            name: live_weather::NAME.to_string(),
            arguments: call.arguments.clone(),
        };
        let live = match self.execute(&live_call).await {
            Ok(result) => result_value(result),
            Err(message) => json!({ "success": false, "error": message }),
        };

        json!({ "stored": result_value(stored), "live": live }).to_string()
    }

    fn publish_executed(&self, tool_name: &str, success: bool, duration_ms: u64) {
        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: tool_name.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
    }
}

/// Arguments must be a JSON object. Nothing is coerced.
fn parse_arguments(raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("Invalid tool arguments: expected a JSON object".into()),
        Err(e) => Err(format!("Invalid tool arguments: {e}")),
    }
}

fn result_value(result: ToolResult) -> Value {
    match result.data {
        Some(data) => data,
        None => Value::String(result.output),
    }
}
