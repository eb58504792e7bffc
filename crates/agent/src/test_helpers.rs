//! Shared test helpers for loop and dispatch tests.

use async_trait::async_trait;
use chrono::Utc;
use skywatch_core::error::{FetchError, ProviderError};
use skywatch_core::message::{Message, MessageToolCall};
use skywatch_core::observation::{CleanedRecord, Observation};
use skywatch_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use skywatch_core::weather::WeatherSource;
use std::collections::HashMap;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given. Panics if more calls are made than
/// responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    pub fn scripted(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The request sent on call `n` (0-based).
    pub fn request(&self, n: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!(
                "SequentialMockProvider: no more responses (call #{})",
                requests.len()
            );
        }
        requests.push(request);
        responses.remove(0)
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response carrying tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

pub fn record(city: &str, temperature: f64) -> CleanedRecord {
    let now = Utc::now();
    CleanedRecord {
        city_name: city.into(),
        country: "LK".into(),
        temperature,
        feels_like: temperature,
        weather_condition: "Clear".into(),
        weather_description: "Clear Sky".into(),
        humidity: 74,
        wind_speed: 3.6,
        pressure: Some(1010),
        observed_at: now,
        fetched_at: now,
    }
}

/// Live weather source with fixed temperatures per city.
pub struct ScriptedSource {
    temperatures: HashMap<String, f64>,
}

impl ScriptedSource {
    pub fn empty() -> Self {
        Self {
            temperatures: HashMap::new(),
        }
    }

    pub fn with_city(city: &str, temperature: f64) -> Self {
        let mut source = Self::empty();
        source.temperatures.insert(city.into(), temperature);
        source
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_city(&self, city: &str) -> Result<Observation, FetchError> {
        let temperature = self
            .temperatures
            .get(city)
            .ok_or_else(|| FetchError::NotFound(city.into()))?;
        let mut obs = Observation::for_city(city);
        obs.temperature = Some(*temperature);
        Ok(obs)
    }
}
