//! HTTP endpoint server using Axum

use axum::{
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::core::runtime::AlertRuntime;
use crate::core::ws::ws_handler;
use crate::error::AlertError;
use crate::metrics::Metrics;
use crate::models::{Alert, AlertEvent, AlertStatus, User};
use crate::services::users::{InMemoryUserDirectory, UserDirectory};

const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub runtime: Arc<AlertRuntime>,
    pub users: Arc<InMemoryUserDirectory>,
    /// When set, `/ws` requires a matching `apiKey` query parameter.
    pub ws_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        runtime: Arc<AlertRuntime>,
        users: Arc<InMemoryUserDirectory>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            runtime,
            users,
            ws_api_key: None,
        }
    }

    pub fn with_ws_api_key(mut self, key: Option<String>) -> Self {
        self.ws_api_key = key;
        self
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// REST-facing error: not found → 404, invalid definition → 400.
#[derive(Debug)]
pub struct ApiError(AlertError);

impl From<AlertError> for ApiError {
    fn from(e: AlertError) -> Self {
        Self(e)
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AlertError::NotFound(_) => not_found(),
            AlertError::Invalid(reason) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response()
            }
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "pricewatch-alert-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// `{index}` path segment. Anything that is not a valid index (negative,
/// non-numeric) is reported like an out-of-range one.
struct AlertIndex(usize);

impl<S> FromRequestParts<S> for AlertIndex
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<usize>::from_request_parts(parts, state)
            .await
            .map(|Path(index)| AlertIndex(index))
            .map_err(|_| not_found())
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TestTriggerQuery {
    #[serde(default)]
    deliver: bool,
}

/// List all alerts in registry order
async fn list_alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    Json(state.runtime.context().registry.all().await)
}

async fn create_alert(
    State(state): State<AppState>,
    Json(alert): Json<Alert>,
) -> Result<Json<Value>, ApiError> {
    let registry = &state.runtime.context().registry;
    let (id, index) = registry.add(alert).await?;
    state.metrics.alerts_registered.set(registry.len().await as i64);

    info!(alert_id = id, index, "Alert registered");
    Ok(Json(json!({ "success": true, "id": id, "index": index })))
}

async fn get_alert(
    State(state): State<AppState>,
    AlertIndex(index): AlertIndex,
) -> Result<Json<Alert>, ApiError> {
    Ok(Json(state.runtime.context().registry.get_at(index).await?))
}

async fn delete_alert(
    State(state): State<AppState>,
    AlertIndex(index): AlertIndex,
) -> Result<Json<Value>, ApiError> {
    let registry = &state.runtime.context().registry;
    let removed = registry.remove_at(index).await?;
    state.metrics.alerts_registered.set(registry.len().await as i64);

    info!(alert_id = removed.id, index, "Alert removed");
    Ok(Json(json!({ "success": true })))
}

async fn alert_status(State(state): State<AppState>) -> Json<Vec<AlertStatus>> {
    Json(state.runtime.statuses().await)
}

async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<Vec<AlertEvent>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.runtime.context().history.list(limit).await)
}

async fn clear_history(State(state): State<AppState>) -> Json<Value> {
    state.runtime.context().history.clear().await;
    info!("Alert history cleared");
    Json(json!({ "success": true }))
}

async fn test_alert(
    State(state): State<AppState>,
    AlertIndex(index): AlertIndex,
    Query(params): Query<TestTriggerQuery>,
) -> Result<Json<Value>, ApiError> {
    let event = state.runtime.trigger_test(index, params.deliver).await?;
    Ok(Json(json!({
        "success": true,
        "message": event.message,
        "event": event,
    })))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.all_users().await)
}

async fn replace_users(
    State(state): State<AppState>,
    Json(users): Json<Vec<User>>,
) -> Json<Value> {
    let count = users.len();
    state.users.replace(users).await;
    info!(count, "User directory replaced");
    Json(json!({ "success": true, "count": count }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/alerts", get(list_alerts).post(create_alert))
        .route("/alerts/status", get(alert_status))
        .route("/alerts/history", get(list_history).delete(clear_history))
        .route("/alerts/test/{index}", post(test_alert))
        .route("/alerts/{index}", get(get_alert).delete(delete_alert))
        .route("/users", get(list_users).put(replace_users))
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
