//! Typed view models and their field tables.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapter::{EntitySchema, FormInput};
use crate::errors::ServiceError;

pub mod crop;
pub mod farm;
pub mod financial;
pub mod inventory;
pub mod irrigation;
pub mod task;
pub mod weather;

pub use crop::Crop;
pub use farm::Farm;
pub use financial::FinancialRecord;
pub use inventory::{InventoryItem, StockStatus};
pub use irrigation::IrrigationRecord;
pub use task::Task;
pub use weather::WeatherForecast;

/// An entity persisted through the record adapter.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    fn id(&self) -> i64;

    /// The entity as form input, for re-submitting a fetched record.
    fn to_form(&self) -> Result<FormInput, ServiceError> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ServiceError::SerializationError(format!(
                "{} serialised to {}",
                Self::schema().entity,
                other
            ))),
        }
    }
}

macro_rules! impl_entity {
    ($ty:ty, $schema:expr) => {
        impl $crate::entities::Entity for $ty {
            fn schema() -> &'static $crate::adapter::EntitySchema {
                &$schema
            }

            fn id(&self) -> i64 {
                self.id
            }
        }
    };
}

pub(crate) use impl_entity;
