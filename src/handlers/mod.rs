pub mod common;
pub mod dashboard;
pub mod farms;
pub mod health;
pub mod inventory;
pub mod records;
pub mod tasks;
pub mod weather;

use axum::Router;

use crate::entities::{Crop, Farm, FinancialRecord, InventoryItem, IrrigationRecord, Task};
use crate::AppState;
use records::record_routes;

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/farms", record_routes::<Farm>().merge(farms::farm_routes()))
        .nest("/crops", record_routes::<Crop>().merge(farms::crop_routes()))
        .nest("/tasks", record_routes::<Task>().merge(tasks::task_routes()))
        .nest(
            "/finances",
            record_routes::<FinancialRecord>().merge(farms::finance_routes()),
        )
        .nest(
            "/inventory",
            record_routes::<InventoryItem>().merge(inventory::inventory_routes()),
        )
        .nest(
            "/irrigation",
            record_routes::<IrrigationRecord>().merge(farms::irrigation_routes()),
        )
        .nest("/weather", weather::weather_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
}
