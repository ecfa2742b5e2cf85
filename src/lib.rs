//! Farmstead API Library
//!
//! Record adapter and HTTP surface for the farm management backend: farms,
//! crops, tasks, finances, inventory, irrigation and weather, persisted
//! through a configurable record store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod adapter;
pub mod config;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod repositories;
pub mod services;
pub mod store;
pub mod tracing;

use axum::{http::HeaderValue, response::Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(config: config::AppConfig, services: services::AppServices) -> Self {
        Self {
            config: Arc::new(config),
            services,
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// CORS from configured origins; permissive only in development.
pub fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if config.is_development() {
        ::tracing::info!("using permissive CORS in development");
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("no CORS origins configured; cross-origin requests are rejected");
        CorsLayer::new()
    }
}

/// Full application router with the shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", handlers::api_v1_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        // Outermost so every span and error body carries the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn message_is_kept_alongside_data() {
        let response = ApiResponse::with_message(3, "Deleted");
        assert!(response.success);
        assert_eq!(response.data, Some(3));
        assert_eq!(response.message.as_deref(), Some("Deleted"));
    }
}
