use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use serde_json::Value;

use super::common::{success_response, today, JsonBody};
use crate::entities::InventoryItem;
use crate::services::InventoryStatistics;
use crate::{ApiResult, AppState};

/// Body of the stock quick-update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRequest {
    /// Coerced like any integer field: strings and floats are accepted
    pub current_stock: Value,
}

pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<InventoryItem>> {
    let items = state.services.inventory_service().low_stock().await?;
    Ok(success_response(items))
}

pub async fn statistics(State(state): State<AppState>) -> ApiResult<InventoryStatistics> {
    let stats = state.services.inventory_service().statistics(today()).await?;
    Ok(success_response(stats))
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<InventoryItem>> {
    let items = state.services.inventory_service().by_category(&category).await?;
    Ok(success_response(items))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<StockUpdateRequest>,
) -> ApiResult<InventoryItem> {
    let item = state
        .services
        .inventory_service()
        .update_stock(id, request.current_stock)
        .await?;
    Ok(success_response(item))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/statistics", get(statistics))
        .route("/category/:category", get(by_category))
        .route("/:id/stock", patch(update_stock))
}
