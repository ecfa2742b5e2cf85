//! Generic list/detail/create/update/delete routes shared by every
//! writable entity.

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{created_response, success_response, JsonBody};
use crate::adapter::FormInput;
use crate::entities::{Crop, Entity, Farm, FinancialRecord, InventoryItem, IrrigationRecord, Task};
use crate::errors::ServiceError;
use crate::repositories::Repository;
use crate::services::filters::{search, InventoryFilter, Searchable, StockFilter};
use crate::services::AppServices;
use crate::{ApiResponse, ApiResult, AppState};

/// List query parameters; `category` and `stock` only apply to inventory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub stock: Option<StockFilter>,
}

/// An entity exposed through the generic record routes.
#[async_trait]
pub trait Resource: Entity + Searchable {
    fn repository(services: &AppServices) -> &Repository<Self>;

    async fn list(services: &AppServices, query: ListQuery) -> Result<Vec<Self>, ServiceError> {
        let records = Self::repository(services).list().await?;
        Ok(search(records, query.search.as_deref()))
    }
}

impl Resource for Farm {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.farms
    }
}

impl Resource for Crop {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.crops
    }
}

impl Resource for Task {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.tasks
    }
}

impl Resource for FinancialRecord {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.finances
    }
}

impl Resource for IrrigationRecord {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.irrigation
    }
}

#[async_trait]
impl Resource for InventoryItem {
    fn repository(services: &AppServices) -> &Repository<Self> {
        &services.inventory
    }

    async fn list(services: &AppServices, query: ListQuery) -> Result<Vec<Self>, ServiceError> {
        let filter = InventoryFilter {
            search: query.search,
            category: query.category,
            stock: query.stock,
        };
        services.inventory_service().list(&filter).await
    }
}

pub async fn list_records<R: Resource>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<R>> {
    let records = R::list(&state.services, query).await?;
    Ok(success_response(records))
}

pub async fn get_record<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<R> {
    let record = R::repository(&state.services).get_by_id(id).await?;
    Ok(success_response(record))
}

pub async fn create_record<R: Resource>(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<FormInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = R::repository(&state.services).create(&input).await?;
    Ok(created_response(record))
}

/// Full replace: fields absent from the body are reset to their defaults.
pub async fn update_record<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<FormInput>,
) -> ApiResult<R> {
    let record = R::repository(&state.services).update(id, &input).await?;
    Ok(success_response(record))
}

pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let deleted = R::repository(&state.services).delete(id).await?;
    Ok(Json(ApiResponse::with_message(
        json!({ "id": id, "deleted": deleted }),
        format!("{} {} deleted", R::schema().entity, id),
    )))
}

/// `/` and `/:id` routes for one entity
pub fn record_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records::<R>).post(create_record::<R>))
        .route(
            "/:id",
            get(get_record::<R>)
                .put(update_record::<R>)
                .delete(delete_record::<R>),
        )
}
