use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};

use super::common::success_response;
use crate::entities::Task;
use crate::{ApiResult, AppState};

pub async fn tasks_by_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<i64>,
) -> ApiResult<Vec<Task>> {
    Ok(success_response(state.services.tasks_for_crop(crop_id).await?))
}

/// Flips the completed flag of one task
pub async fn toggle_task(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Task> {
    Ok(success_response(state.services.toggle_task(id).await?))
}

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/by-crop/:crop_id", get(tasks_by_crop))
        .route("/:id/toggle", post(toggle_task))
}
