//! HTTP API for SkyWatch.
//!
//! Exposes service info, a health check backed by the store, and the
//! natural-language query endpoint. Built on Axum.

pub mod city;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use skywatch_agent::AgentLoop;
use skywatch_core::observation::StoredRecord;
use skywatch_core::store::WeatherStore;

pub const MAX_QUERY_CHARS: usize = 500;
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub store: Arc<dyn WeatherStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all routes and layers.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/agent/query", post(query_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    state: SharedState,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// --- Handlers ---

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "SkyWatch API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Weather collection pipeline with a natural-language query agent",
        "endpoints": {
            "health": "/health",
            "agent_query": "/agent/query"
        },
        "status": "running"
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    cleaned_records: u64,
    raw_records: u64,
}

async fn health_handler(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let counts = async {
        let cleaned = state.store.count().await?;
        let raw = state.store.raw_count().await?;
        Ok::<_, skywatch_core::error::StoreError>((cleaned, raw))
    };

    match counts.await {
        Ok((cleaned_records, raw_records)) => Ok(Json(HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            cleaned_records,
            raw_records,
        })),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Store unavailable: {e}"),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Structured weather attached to a query answer when the question names a
/// city we have data for.
#[derive(Debug, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: Option<u16>,
}

impl From<StoredRecord> for WeatherInfo {
    fn from(stored: StoredRecord) -> Self {
        let r = stored.record;
        Self {
            city: r.city_name,
            temperature: r.temperature,
            feels_like: r.feels_like,
            condition: r.weather_description,
            humidity: r.humidity,
            wind_speed: r.wind_speed,
            pressure: r.pressure,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherInfo>,
    pub timestamp: DateTime<Utc>,
    pub processing_time_seconds: f64,
}

async fn query_handler(
    State(state): State<SharedState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| api_error(e.status(), e.body_text()))?;

    let chars = request.query.chars().count();
    if chars == 0 || chars > MAX_QUERY_CHARS {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("query must be between 1 and {MAX_QUERY_CHARS} characters, got {chars}"),
        ));
    }

    info!(query_len = chars, "Agent query received");
    let started = Instant::now();

    let weather_data = structured_weather(state.store.as_ref(), &request.query).await;
    let response = state.agent.answer(&request.query).await;

    let elapsed = started.elapsed().as_secs_f64();
    info!(seconds = elapsed, "Agent response generated");

    Ok(Json(QueryResponse {
        query: request.query,
        response,
        weather_data,
        timestamp: Utc::now(),
        processing_time_seconds: (elapsed * 100.0).round() / 100.0,
    }))
}

/// Independent store lookup for the city named in the question, if any.
async fn structured_weather(store: &dyn WeatherStore, query: &str) -> Option<WeatherInfo> {
    let city = city::extract_city(query)?;
    match store.latest_for_city(&city).await {
        Ok(Some(stored)) => Some(WeatherInfo::from(stored)),
        Ok(None) => {
            info!(city = %city, "No structured data for city");
            None
        }
        Err(e) => {
            warn!(city = %city, error = %e, "Structured weather lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use skywatch_core::error::{FetchError, ProviderError, StoreError};
    use skywatch_core::event::EventBus;
    use skywatch_core::message::Message;
    use skywatch_core::observation::{CleanedRecord, Observation, TemperatureStats};
    use skywatch_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use skywatch_core::weather::WeatherSource;
    use skywatch_store::InMemoryStore;
    use tower::ServiceExt;

    /// Always answers with the same text.
    struct CannedProvider;

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }
        async fn complete(&self, _: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant("It is mild and cloudy."),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    struct NoLiveData;

    #[async_trait]
    impl WeatherSource for NoLiveData {
        fn name(&self) -> &str {
            "none"
        }
        async fn fetch_city(&self, city: &str) -> Result<Observation, FetchError> {
            Err(FetchError::NotFound(city.into()))
        }
    }

    struct DownStore;

    #[async_trait]
    impl WeatherStore for DownStore {
        async fn insert_raw_batch(&self, _: &[Observation]) -> Result<usize, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn insert_cleaned_batch(&self, _: &[CleanedRecord]) -> Result<usize, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn latest(&self, _: usize) -> Result<Vec<StoredRecord>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn latest_for_city(&self, _: &str) -> Result<Option<StoredRecord>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn history(
            &self,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<Vec<StoredRecord>, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn temperature_stats(
            &self,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<TemperatureStats, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
        async fn raw_count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Connection("down".into()))
        }
    }

    fn test_state(store: Arc<dyn WeatherStore>) -> SharedState {
        let tools = Arc::new(skywatch_tools::weather_registry(
            store.clone(),
            Arc::new(NoLiveData),
        ));
        let agent = Arc::new(AgentLoop::new(
            Arc::new(CannedProvider),
            "mock-model",
            0.7,
            tools,
            Arc::new(EventBus::default()),
        ));
        Arc::new(GatewayState { agent, store })
    }

    fn record(city: &str) -> CleanedRecord {
        let now = Utc::now();
        CleanedRecord {
            city_name: city.into(),
            country: "LK".into(),
            temperature: 29.5,
            feels_like: 33.0,
            weather_condition: "Clouds".into(),
            weather_description: "Broken Clouds".into(),
            humidity: 79,
            wind_speed: 5.1,
            pressure: Some(1008),
            observed_at: now,
            fetched_at: now,
        }
    }

    fn query_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/agent/query")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let app = build_router(test_state(Arc::new(InMemoryStore::new())));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"]["agent_query"], "/agent/query");
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_raw_batch(&[Observation::for_city("Colombo")])
            .await
            .unwrap();
        let app = build_router(test_state(store));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["raw_records"], 1);
        assert_eq!(body["cleaned_records"], 0);
    }

    #[tokio::test]
    async fn health_is_unavailable_when_store_fails() {
        let app = build_router(test_state(Arc::new(DownStore)));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn query_returns_answer_and_structured_weather() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_cleaned_batch(&[record("Colombo")]).await.unwrap();
        let app = build_router(test_state(store));

        let response = app
            .oneshot(query_request(
                serde_json::json!({"query": "What is the weather in Colombo?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["query"], "What is the weather in Colombo?");
        assert_eq!(body["response"], "It is mild and cloudy.");
        assert_eq!(body["weather_data"]["city"], "Colombo");
        assert_eq!(body["weather_data"]["condition"], "Broken Clouds");
        assert!(body["processing_time_seconds"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn weather_data_absent_without_city_phrase() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_cleaned_batch(&[record("Colombo")]).await.unwrap();
        let app = build_router(test_state(store));

        let response = app
            .oneshot(query_request(
                serde_json::json!({"query": "Compare Colombo and Galle"}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body.get("weather_data").is_none());
    }

    #[tokio::test]
    async fn query_length_is_validated() {
        let state = test_state(Arc::new(InMemoryStore::new()));

        let response = build_router(state.clone())
            .oneshot(query_request(serde_json::json!({"query": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        let response = build_router(state.clone())
            .oneshot(query_request(serde_json::json!({ "query": long })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let exact = "a".repeat(MAX_QUERY_CHARS);
        let response = build_router(state)
            .oneshot(query_request(serde_json::json!({ "query": exact })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_query_field_is_unprocessable() {
        let app = build_router(test_state(Arc::new(InMemoryStore::new())));
        let response = app
            .oneshot(query_request(serde_json::json!({"question": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state(Arc::new(InMemoryStore::new())));
        let huge = "x".repeat(BODY_LIMIT_BYTES + 1);
        let response = app
            .oneshot(query_request(serde_json::json!({ "query": huge })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
