//! In-process fallback store.
//!
//! Used for tables the remote backend does not have. Each table is one ordered
//! collection behind its own async `RwLock`, so writers never interleave with
//! readers of the same table.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    record_id, AggregateFunction, AggregateValue, BatchResult, Condition, FetchParams,
    FetchResult, Operator, Record, RecordResult, RecordStore, SortDirection, ID_COLUMN,
};
use crate::errors::ServiceError;

#[derive(Debug, Default)]
struct MemoryTable {
    /// Highest id ever issued; ids are never reused.
    last_id: i64,
    rows: Vec<Record>,
}

impl MemoryTable {
    fn insert(&mut self, mut record: Record) -> Record {
        self.last_id += 1;
        record.insert(ID_COLUMN.to_string(), Value::from(self.last_id));
        self.rows.push(record.clone());
        record
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|row| record_id(row) == Some(id))
    }
}

/// In-memory record store with simulated latency
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: DashMap<String, Arc<RwLock<MemoryTable>>>,
    latency: Duration,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            tables: DashMap::new(),
            latency,
        }
    }

    /// Appends records to a table, assigning fresh ids. Returns the stored rows.
    pub async fn seed(&self, table: &str, records: Vec<Record>) -> Vec<Record> {
        let handle = self.table(table);
        let mut guard = handle.write().await;
        records
            .into_iter()
            .map(|mut record| {
                record.remove(ID_COLUMN);
                guard.insert(record)
            })
            .collect()
    }

    fn table(&self, name: &str) -> Arc<RwLock<MemoryTable>> {
        Arc::clone(&self.tables.entry(name.to_string()).or_default())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => as_text(a).cmp(&as_text(b)),
        },
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => as_text(a) == as_text(b),
    }
}

fn matches_condition(row: &Record, condition: &Condition) -> bool {
    let value = row.get(&condition.field_name).unwrap_or(&Value::Null);
    let first = condition.values.first();

    match condition.operator {
        Operator::EqualTo => condition.values.iter().any(|v| loosely_equal(value, v)),
        Operator::NotEqualTo => !condition.values.iter().any(|v| loosely_equal(value, v)),
        Operator::Contains => first.map_or(false, |needle| {
            as_text(value)
                .to_lowercase()
                .contains(&as_text(needle).to_lowercase())
        }),
        op => {
            if value.is_null() {
                return false;
            }
            let Some(bound) = first else {
                return false;
            };
            let ordering = compare_values(Some(value), Some(bound));
            match op {
                Operator::LessThan => ordering == Ordering::Less,
                Operator::LessThanOrEqualTo => ordering != Ordering::Greater,
                Operator::GreaterThan => ordering == Ordering::Greater,
                Operator::GreaterThanOrEqualTo => ordering != Ordering::Less,
                _ => false,
            }
        }
    }
}

fn project(row: &Record, fields: &[&str]) -> Record {
    if fields.is_empty() {
        return row.clone();
    }
    row.iter()
        .filter(|(column, _)| column.as_str() == ID_COLUMN || fields.contains(&column.as_str()))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    async fn fetch_records(&self, table: &str, params: FetchParams) -> Result<FetchResult, ServiceError> {
        self.simulate_latency().await;
        let handle = self.table(table);
        let guard = handle.read().await;

        let mut rows: Vec<&Record> = guard
            .rows
            .iter()
            .filter(|row| params.conditions.iter().all(|c| matches_condition(row, c)))
            .collect();
        let total = rows.len() as u64;

        let aggregators = params
            .aggregators
            .iter()
            .map(|agg| {
                let value = agg
                    .fields
                    .iter()
                    .map(|field| match field.function {
                        AggregateFunction::Count => rows.len() as f64,
                    })
                    .next()
                    .unwrap_or(0.0);
                AggregateValue {
                    id: agg.id.clone(),
                    value,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            params
                .order_by
                .iter()
                .map(|order| {
                    let ordering =
                        compare_values(a.get(&order.field_name), b.get(&order.field_name));
                    match order.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let mut data: Vec<Record> = if params.group_by.is_empty() {
            let fields = params.field_names();
            rows.iter().map(|row| project(row, &fields)).collect()
        } else {
            let mut groups: Vec<Record> = Vec::new();
            for row in &rows {
                let key: Record = params
                    .group_by
                    .iter()
                    .map(|column| (column.clone(), row.get(column).cloned().unwrap_or(Value::Null)))
                    .collect();
                if !groups.contains(&key) {
                    groups.push(key);
                }
            }
            groups
        };

        if let Some(paging) = params.paging {
            data = data
                .into_iter()
                .skip(paging.offset as usize)
                .take(paging.limit as usize)
                .collect();
        }

        debug!(table, returned = data.len(), total, "in-memory fetch");
        Ok(FetchResult {
            data,
            total: Some(total),
            aggregators,
        })
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[String],
    ) -> Result<Option<Record>, ServiceError> {
        self.simulate_latency().await;
        let handle = self.table(table);
        let guard = handle.read().await;
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

        Ok(guard
            .position(id)
            .map(|index| project(&guard.rows[index], &fields)))
    }

    async fn create_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError> {
        self.simulate_latency().await;
        let handle = self.table(table);
        let mut guard = handle.write().await;

        let results = records
            .into_iter()
            .map(|mut record| {
                record.remove(ID_COLUMN);
                RecordResult::ok(Some(guard.insert(record)))
            })
            .collect();

        Ok(BatchResult { results })
    }

    async fn update_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError> {
        self.simulate_latency().await;
        let handle = self.table(table);
        let mut guard = handle.write().await;

        let results = records
            .into_iter()
            .map(|record| {
                let Some(id) = record_id(&record) else {
                    return RecordResult::failed("Record Id is required for update");
                };
                let Some(index) = guard.position(id) else {
                    return RecordResult::failed(format!("Record with Id {} not found", id));
                };
                let row = &mut guard.rows[index];
                for (column, value) in record {
                    if column != ID_COLUMN {
                        row.insert(column, value);
                    }
                }
                RecordResult::ok(Some(row.clone()))
            })
            .collect();

        Ok(BatchResult { results })
    }

    async fn delete_records(&self, table: &str, ids: Vec<i64>) -> Result<BatchResult, ServiceError> {
        self.simulate_latency().await;
        let handle = self.table(table);
        let mut guard = handle.write().await;

        let results = ids
            .into_iter()
            .map(|id| match guard.position(id) {
                Some(index) => {
                    guard.rows.remove(index);
                    RecordResult::ok(None)
                }
                None => RecordResult::failed(format!("Record with Id {} not found", id)),
            })
            .collect();

        Ok(BatchResult { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Aggregator, OrderBy, PagingInfo};
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    async fn store_with_farms() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        store
            .seed(
                "farm_c",
                vec![
                    record(json!({"name_c": "North Field", "size_acres_c": 10, "type_c": "Crop"})),
                    record(json!({"name_c": "Orchard", "size_acres_c": 20.5, "type_c": "Fruit"})),
                    record(json!({"name_c": "Pasture", "size_acres_c": 4, "type_c": "Crop"})),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn ids_are_never_reused_after_delete() {
        let store = store_with_farms().await;

        let deleted = store.delete_records("farm_c", vec![3]).await.unwrap();
        assert!(deleted.results[0].success);

        let created = store
            .create_records("farm_c", vec![record(json!({"name_c": "New"}))])
            .await
            .unwrap();
        let row = created.results[0].data.as_ref().unwrap();
        assert_eq!(record_id(row), Some(4));
    }

    #[tokio::test]
    async fn fetch_filters_orders_and_pages() {
        let store = store_with_farms().await;

        let mut params = FetchParams::with_fields(["name_c"]);
        params.conditions.push(Condition::eq("type_c", "Crop"));
        params.order_by.push(OrderBy {
            field_name: ID_COLUMN.into(),
            direction: SortDirection::Desc,
        });
        params.paging = Some(PagingInfo {
            limit: 1,
            offset: 0,
        });

        let result = store.fetch_records("farm_c", params).await.unwrap();
        assert_eq!(result.total, Some(2));
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["name_c"], "Pasture");
        assert!(result.data[0].get("size_acres_c").is_none());
        assert_eq!(record_id(&result.data[0]), Some(3));
    }

    #[tokio::test]
    async fn fetch_supports_comparison_and_aggregates() {
        let store = store_with_farms().await;

        let mut params = FetchParams::default();
        params.conditions.push(Condition::new(
            "size_acres_c",
            Operator::GreaterThanOrEqualTo,
            10,
        ));
        params.aggregators.push(Aggregator::count("farms"));

        let result = store.fetch_records("farm_c", params).await.unwrap();
        assert_eq!(result.aggregate("farms"), Some(2.0));
    }

    #[tokio::test]
    async fn group_by_returns_distinct_values() {
        let store = store_with_farms().await;
        let params = FetchParams {
            group_by: vec!["type_c".into()],
            ..Default::default()
        };

        let result = store.fetch_records("farm_c", params).await.unwrap();
        assert_eq!(result.data.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_present_columns_and_reports_missing_ids() {
        let store = store_with_farms().await;

        let result = store
            .update_records(
                "farm_c",
                vec![
                    record(json!({"Id": 2, "size_acres_c": 22})),
                    record(json!({"Id": 99, "size_acres_c": 1})),
                ],
            )
            .await
            .unwrap();

        assert!(result.results[0].success);
        assert!(!result.results[1].success);

        let row = store
            .get_record_by_id("farm_c", 2, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["name_c"], "Orchard");
        assert_eq!(row["size_acres_c"], 22);
    }

    #[tokio::test]
    async fn unknown_table_is_empty() {
        let store = InMemoryRecordStore::new();
        let result = store
            .fetch_records("weather_c", FetchParams::default())
            .await
            .unwrap();
        assert!(result.data.is_empty());
        assert!(store
            .get_record_by_id("weather_c", 1, &[])
            .await
            .unwrap()
            .is_none());
    }
}
