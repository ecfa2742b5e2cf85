use axum::{extract::State, routing::get, Router};

use super::common::success_response;
use crate::entities::WeatherForecast;
use crate::{ApiResult, AppState};

pub async fn forecast(State(state): State<AppState>) -> ApiResult<Vec<WeatherForecast>> {
    Ok(success_response(state.services.weather.list().await?))
}

/// First forecast entry; `data` is null when there is no forecast.
pub async fn current(State(state): State<AppState>) -> ApiResult<Option<WeatherForecast>> {
    Ok(success_response(state.services.current_weather().await?))
}

pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/forecast", get(forecast))
        .route("/current", get(current))
}
