use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{FieldFilter, FormInput, TableMapping};
use crate::entities::{Entity, InventoryItem};
use crate::errors::ServiceError;
use crate::store::{
    Aggregator, FetchParams, PagingInfo, Record, RecordResult, SharedRecordStore, ID_COLUMN,
};

/// Generic CRUD over one entity table.
///
/// All column knowledge lives in the [`TableMapping`]; this type only sequences
/// validation, store calls and decoding.
#[derive(Clone)]
pub struct Repository<E: Entity> {
    store: SharedRecordStore,
    mapping: TableMapping,
    page_size: u32,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(store: SharedRecordStore, mapping: TableMapping, page_size: u32) -> Self {
        Self {
            store,
            mapping,
            page_size,
            _entity: PhantomData,
        }
    }

    pub fn mapping(&self) -> &TableMapping {
        &self.mapping
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    fn entity_name(&self) -> &'static str {
        self.mapping.schema().entity
    }

    fn page_limit(&self) -> u32 {
        self.mapping.schema().page_limit.unwrap_or(self.page_size)
    }

    fn base_params(&self) -> FetchParams {
        let mut params = FetchParams::with_fields(self.mapping.read_projection());
        params.order_by.push(self.mapping.default_order());
        params.paging = Some(PagingInfo {
            limit: self.page_limit(),
            offset: 0,
        });
        params
    }

    fn hydrate(&self, record: &Record) -> Result<E, ServiceError> {
        let value = self.mapping.decode(record)?;
        Ok(serde_json::from_value(value)?)
    }

    fn ensure_writable(&self, action: &str) -> Result<(), ServiceError> {
        if self.mapping.schema().read_only {
            return Err(ServiceError::InvalidOperation(format!(
                "{} records are read-only and cannot be {}",
                self.entity_name(),
                action
            )));
        }
        Ok(())
    }

    fn first_record(&self, results: Vec<RecordResult>, action: &str) -> Result<Record, ServiceError> {
        results
            .into_iter()
            .find_map(|result| result.data)
            .ok_or_else(|| {
                ServiceError::FetchError(format!(
                    "Record store returned no {} for the {} record",
                    self.entity_name(),
                    action
                ))
            })
    }

    /// First page in default order.
    pub async fn list(&self) -> Result<Vec<E>, ServiceError> {
        self.list_where(&[]).await
    }

    #[instrument(skip(self), fields(table = self.mapping.table()))]
    pub async fn list_where(&self, filters: &[FieldFilter]) -> Result<Vec<E>, ServiceError> {
        let mut params = self.base_params();
        for filter in filters {
            params.conditions.push(self.mapping.condition(filter)?);
        }

        let result = self
            .store
            .fetch_records(self.mapping.table(), params)
            .await?;
        debug!(rows = result.data.len(), total = ?result.total, "fetched records");

        result.data.iter().map(|record| self.hydrate(record)).collect()
    }

    /// Number of rows in the table, via a count aggregate.
    #[instrument(skip(self), fields(table = self.mapping.table()))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        let mut params = FetchParams::with_fields([ID_COLUMN]);
        params.aggregators.push(Aggregator::count("rows"));
        params.paging = Some(PagingInfo { limit: 1, offset: 0 });

        let result = self
            .store
            .fetch_records(self.mapping.table(), params)
            .await?;
        let count = result
            .aggregate("rows")
            .map(|n| n.max(0.0) as u64)
            .or(result.total)
            .unwrap_or(result.data.len() as u64);
        Ok(count)
    }

    #[instrument(skip(self), fields(table = self.mapping.table()))]
    pub async fn get_by_id(&self, id: i64) -> Result<E, ServiceError> {
        let projection = self.mapping.read_projection();
        let record = self
            .store
            .get_record_by_id(self.mapping.table(), id, &projection)
            .await?;

        match record {
            Some(record) => self.hydrate(&record),
            None => Err(self.not_found(id)),
        }
    }

    fn not_found(&self, id: i64) -> ServiceError {
        ServiceError::NotFound(format!("{} with id {}", self.entity_name(), id))
    }

    /// A rejected single-row write against a row that does not exist is a
    /// `NotFound`; any other rejection is passed through.
    async fn classify_rejection(&self, id: i64, err: ServiceError) -> ServiceError {
        if !matches!(err, ServiceError::PartialBatch { .. }) {
            return err;
        }
        let id_only = [ID_COLUMN.to_string()];
        match self
            .store
            .get_record_by_id(self.mapping.table(), id, &id_only)
            .await
        {
            Ok(None) => self.not_found(id),
            _ => err,
        }
    }

    #[instrument(skip(self, input), fields(table = self.mapping.table()))]
    pub async fn create(&self, input: &FormInput) -> Result<E, ServiceError> {
        self.ensure_writable("created")?;
        let record = self.mapping.encode(input)?;

        let batch = self
            .store
            .create_records(self.mapping.table(), vec![record])
            .await?;
        let fallback = format!("Failed to create {}", self.entity_name().to_lowercase());
        let results = batch.into_successes(&fallback).map_err(|e| {
            warn!(error = %e, "create rejected by record store");
            e
        })?;

        let created = self.hydrate(&self.first_record(results, "created")?)?;
        info!(id = created.id(), "{} created", self.entity_name());
        Ok(created)
    }

    /// Full replace: fields missing from `input` are written with their default.
    #[instrument(skip(self, input), fields(table = self.mapping.table()))]
    pub async fn update(&self, id: i64, input: &FormInput) -> Result<E, ServiceError> {
        self.ensure_writable("updated")?;
        let record = self.mapping.encode(input)?;
        self.write_update(id, record).await
    }

    /// Writes only the supplied fields.
    #[instrument(skip(self, input), fields(table = self.mapping.table()))]
    pub async fn patch(&self, id: i64, input: &FormInput) -> Result<E, ServiceError> {
        self.ensure_writable("updated")?;
        let record = self.mapping.encode_patch(input)?;
        if record.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "No {} fields to update",
                self.entity_name().to_lowercase()
            )));
        }
        self.write_update(id, record).await
    }

    async fn write_update(&self, id: i64, mut record: Record) -> Result<E, ServiceError> {
        record.insert(ID_COLUMN.to_string(), Value::from(id));

        let batch = self
            .store
            .update_records(self.mapping.table(), vec![record])
            .await?;
        let fallback = format!("Failed to update {}", self.entity_name().to_lowercase());
        let results = match batch.into_successes(&fallback) {
            Ok(results) => results,
            Err(e) => {
                warn!(id, error = %e, "update rejected by record store");
                return Err(self.classify_rejection(id, e).await);
            }
        };

        // Some deployments acknowledge updates without echoing the row.
        let updated = match results.into_iter().find_map(|r| r.data) {
            Some(record) => self.hydrate(&record)?,
            None => self.get_by_id(id).await?,
        };
        info!(id, "{} updated", self.entity_name());
        Ok(updated)
    }

    #[instrument(skip(self), fields(table = self.mapping.table()))]
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        self.ensure_writable("deleted")?;

        let batch = self
            .store
            .delete_records(self.mapping.table(), vec![id])
            .await?;
        let fallback = format!("Failed to delete {}", self.entity_name().to_lowercase());
        if let Err(e) = batch.into_successes(&fallback) {
            warn!(id, error = %e, "delete rejected by record store");
            return Err(self.classify_rejection(id, e).await);
        }

        info!(id, "{} deleted", self.entity_name());
        Ok(true)
    }
}

impl Repository<InventoryItem> {
    /// Stock quick-update: writes the current-stock column alone.
    pub async fn update_stock(&self, id: i64, current_stock: Value) -> Result<InventoryItem, ServiceError> {
        let mut input = FormInput::new();
        input.insert("currentStock".to_string(), current_stock);
        self.patch(id, &input).await
    }
}
