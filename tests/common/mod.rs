#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use farmstead_api::{
    config::{AppConfig, RecordStoreConfig},
    services::AppServices,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory store with no simulated latency.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Empty tables.
    pub async fn new() -> Self {
        Self::with_seed(false).await
    }

    /// Tables filled with the demo rows.
    pub async fn seeded() -> Self {
        Self::with_seed(true).await
    }

    async fn with_seed(seed: bool) -> Self {
        let config = AppConfig {
            record_store: RecordStoreConfig {
                simulated_latency_ms: 0,
                seed_fallback: seed,
                ..RecordStoreConfig::default()
            },
            ..AppConfig::default()
        };

        let today = farmstead_api::handlers::common::today();
        let services = AppServices::from_config(&config.record_store, today)
            .await
            .expect("failed to build services");
        let state = AppState::new(config, services);

        Self {
            router: farmstead_api::build_router(state.clone()),
            state,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                let bytes = serde_json::to_vec(&json).expect("failed to serialize json request body");
                self.request_raw(method, uri, Some("application/json"), bytes).await
            }
            None => self.request_raw(method, uri, None, Vec::new()).await,
        }
    }

    /// Sends `body` as-is, for requests the JSON helper cannot express.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }

        let request = builder.body(Body::from(body)).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }
}
