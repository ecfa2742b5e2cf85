//! Farm, crop, finance and irrigation extras beyond plain CRUD.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use super::common::success_response;
use crate::entities::financial::FinanceTotals;
use crate::entities::irrigation::IrrigationSummary;
use crate::entities::Crop;
use crate::services::FarmSummary;
use crate::{ApiResult, AppState};

pub async fn farm_summary(State(state): State<AppState>) -> ApiResult<FarmSummary> {
    Ok(success_response(state.services.farm_summary().await?))
}

pub async fn crops_by_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
) -> ApiResult<Vec<Crop>> {
    Ok(success_response(state.services.crops_for_farm(farm_id).await?))
}

pub async fn finance_summary(State(state): State<AppState>) -> ApiResult<FinanceTotals> {
    Ok(success_response(state.services.finance_summary().await?))
}

pub async fn irrigation_summary(State(state): State<AppState>) -> ApiResult<IrrigationSummary> {
    Ok(success_response(state.services.irrigation_summary().await?))
}

pub fn farm_routes() -> Router<AppState> {
    Router::new().route("/summary", get(farm_summary))
}

pub fn crop_routes() -> Router<AppState> {
    Router::new().route("/by-farm/:farm_id", get(crops_by_farm))
}

pub fn finance_routes() -> Router<AppState> {
    Router::new().route("/summary", get(finance_summary))
}

pub fn irrigation_routes() -> Router<AppState> {
    Router::new().route("/summary", get(irrigation_summary))
}
