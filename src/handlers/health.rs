use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

use crate::entities::Entity;
use crate::repositories::Repository;
use crate::AppState;

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

/// Round-trip result for one table
#[derive(Debug, Clone, Serialize)]
pub struct TableHealth {
    pub table: &'static str,
    pub backend: &'static str,
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: ComponentStatus,
    pub version: &'static str,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub tables: Vec<TableHealth>,
    pub response_time_ms: u64,
}

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

async fn check_table<E: Entity>(repository: &Repository<E>) -> TableHealth {
    let start = Instant::now();
    let result = repository.count().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, records, error) = match result {
        Ok(count) => (ComponentStatus::Up, Some(count), None),
        Err(err) => (ComponentStatus::Down, None, Some(err.response_message())),
    };
    TableHealth {
        table: repository.mapping().table(),
        backend: repository.backend(),
        status,
        records,
        error,
        latency_ms,
    }
}

/// Basic liveness probe - just checks if the service is running
async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness probe - counts every table through its configured store
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let services = &state.services;

    let (farms, crops, tasks, finances, inventory, irrigation, weather) = tokio::join!(
        check_table(&services.farms),
        check_table(&services.crops),
        check_table(&services.tasks),
        check_table(&services.finances),
        check_table(&services.inventory),
        check_table(&services.irrigation),
        check_table(&services.weather),
    );
    let tables = vec![farms, crops, tasks, finances, inventory, irrigation, weather];

    let status = if tables.iter().all(|t| t.status == ComponentStatus::Up) {
        ComponentStatus::Up
    } else {
        ComponentStatus::Down
    };
    let status_code = match status {
        ComponentStatus::Up => StatusCode::OK,
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: get_uptime_secs(),
        tables,
        response_time_ms: start.elapsed().as_millis() as u64,
    };

    (status_code, Json(response))
}

/// Creates the router for health check endpoints
///
/// Endpoints:
/// - GET /health       - Basic liveness probe (always returns 200 if server is running)
/// - GET /health/ready - Readiness probe (one count per table)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness_check))
        .route("/health/ready", get(readiness_check))
}
