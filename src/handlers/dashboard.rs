use axum::{extract::State, routing::get, Router};

use super::common::{success_response, today};
use crate::services::DashboardSummary;
use crate::{ApiResult, AppState};

/// All dashboard aggregates; fails as a whole if any list read fails.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let summary = state.services.dashboard().summary_for(today()).await?;
    Ok(success_response(summary))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}
