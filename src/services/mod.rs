use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::adapter::FieldFilter;
use crate::config::RecordStoreConfig;
use crate::entities::{
    farm, financial, irrigation, Crop, Entity, Farm, FinancialRecord, InventoryItem,
    IrrigationRecord, Task, WeatherForecast,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;
use crate::store::SharedRecordStore;

// Page-level operations
pub mod dashboard;
pub mod inventory;

// List search and inventory filters
pub mod filters;

// Repository construction and store selection
pub mod factory;

pub use dashboard::{DashboardService, DashboardSummary};
pub use factory::RepositoryFactory;
pub use inventory::{InventoryService, InventoryStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSummary {
    pub farms: usize,
    pub total_acres: f64,
}

/// Which backend serves each table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBackend {
    pub table: &'static str,
    pub backend: &'static str,
}

/// One repository per entity, all built from the same injected clients.
#[derive(Clone)]
pub struct AppServices {
    pub farms: Repository<Farm>,
    pub crops: Repository<Crop>,
    pub tasks: Repository<Task>,
    pub finances: Repository<FinancialRecord>,
    pub inventory: Repository<InventoryItem>,
    pub irrigation: Repository<IrrigationRecord>,
    pub weather: Repository<WeatherForecast>,
}

impl AppServices {
    pub fn new(factory: &RepositoryFactory) -> Self {
        Self {
            farms: factory.repository(),
            crops: factory.repository(),
            tasks: factory.repository(),
            finances: factory.repository(),
            inventory: factory.repository(),
            irrigation: factory.repository(),
            weather: factory.repository(),
        }
    }

    /// Builds the configured stores and seeds in-memory tables.
    pub async fn from_config(config: &RecordStoreConfig, today: NaiveDate) -> Result<Self, ServiceError> {
        let factory = RepositoryFactory::new(config.clone())?;

        // Seed parents first so demo references line up.
        let seeded = factory.seed::<Farm>(today).await?
            + factory.seed::<Crop>(today).await?
            + factory.seed::<Task>(today).await?
            + factory.seed::<FinancialRecord>(today).await?
            + factory.seed::<InventoryItem>(today).await?
            + factory.seed::<IrrigationRecord>(today).await?
            + factory.seed::<WeatherForecast>(today).await?;
        if seeded > 0 {
            info!(rows = seeded, "in-memory tables seeded with demo data");
        }

        Ok(Self::new(&factory))
    }

    /// Every table on one store.
    pub fn with_store(config: &RecordStoreConfig, store: SharedRecordStore) -> Self {
        Self::new(&RepositoryFactory::with_store(config.clone(), store))
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(
            self.farms.clone(),
            self.crops.clone(),
            self.tasks.clone(),
            self.finances.clone(),
            self.weather.clone(),
            self.inventory.clone(),
        )
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(self.inventory.clone())
    }

    pub fn backends(&self) -> Vec<TableBackend> {
        fn entry<E: Entity>(repo: &Repository<E>) -> TableBackend {
            TableBackend {
                table: repo.mapping().table(),
                backend: repo.backend(),
            }
        }
        vec![
            entry(&self.farms),
            entry(&self.crops),
            entry(&self.tasks),
            entry(&self.finances),
            entry(&self.inventory),
            entry(&self.irrigation),
            entry(&self.weather),
        ]
    }

    pub async fn crops_for_farm(&self, farm_id: i64) -> Result<Vec<Crop>, ServiceError> {
        self.crops
            .list_where(&[FieldFilter::eq("farmId", farm_id)])
            .await
    }

    pub async fn tasks_for_crop(&self, crop_id: i64) -> Result<Vec<Task>, ServiceError> {
        self.tasks
            .list_where(&[FieldFilter::eq("cropId", crop_id)])
            .await
    }

    /// Flips `completed` by re-submitting the whole fetched task.
    #[instrument(skip(self))]
    pub async fn toggle_task(&self, id: i64) -> Result<Task, ServiceError> {
        let task = self.tasks.get_by_id(id).await?;
        let mut form = task.to_form()?;
        form.insert("completed".to_string(), Value::Bool(!task.completed));
        self.tasks.update(id, &form).await
    }

    /// First forecast entry, if any
    pub async fn current_weather(&self) -> Result<Option<WeatherForecast>, ServiceError> {
        Ok(self.weather.list().await?.into_iter().next())
    }

    pub async fn farm_summary(&self) -> Result<FarmSummary, ServiceError> {
        let farms = self.farms.list().await?;
        Ok(FarmSummary {
            farms: farms.len(),
            total_acres: farm::total_acres(&farms),
        })
    }

    pub async fn irrigation_summary(&self) -> Result<irrigation::IrrigationSummary, ServiceError> {
        Ok(irrigation::summarize(&self.irrigation.list().await?))
    }

    pub async fn finance_summary(&self) -> Result<financial::FinanceTotals, ServiceError> {
        Ok(financial::totals(&self.finances.list().await?))
    }
}
