/*!
 * # Record Store Boundary
 *
 * Generic verbs over named tables of JSON records. Column names at this
 * boundary are the backend's native names; mapping to entity field names
 * happens in [`crate::adapter`].
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::errors::ServiceError;

pub mod memory;
pub mod remote;
pub mod seed;

pub use memory::InMemoryRecordStore;
pub use remote::RemoteRecordStore;

/// A backend row keyed by native column names. The identifier lives under `Id`.
pub type Record = Map<String, Value>;

/// Column holding the backend-assigned identifier
pub const ID_COLUMN: &str = "Id";

/// Extracts the backend identifier from a record, if present.
pub fn record_id(record: &Record) -> Option<i64> {
    match record.get(ID_COLUMN)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldRef {
    #[serde(rename = "Name")]
    pub name: String,
}

/// One entry of a field projection: `{"field": {"Name": "name_c"}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSelector {
    pub field: FieldRef,
}

impl FieldSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldRef { name: name.into() },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Contains,
}

/// Predicate on a single column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(field_name: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            values: vec![value.into()],
        }
    }

    pub fn eq(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field_name, Operator::EqualTo, value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateField {
    pub field: FieldRef,
    #[serde(rename = "Function")]
    pub function: AggregateFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aggregator {
    pub id: String,
    pub fields: Vec<AggregateField>,
}

impl Aggregator {
    pub fn count(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: vec![AggregateField {
                field: FieldRef {
                    name: ID_COLUMN.to_string(),
                },
                function: AggregateFunction::Count,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateValue {
    pub id: String,
    pub value: f64,
}

/// Query parameters for `fetch_records`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchParams {
    #[serde(default)]
    pub fields: Vec<FieldSelector>,
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, rename = "pagingInfo", skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregators: Vec<Aggregator>,
    #[serde(default, rename = "groupBy", skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
}

impl FetchParams {
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(FieldSelector::new).collect(),
            ..Default::default()
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.name.as_str()).collect()
    }
}

/// Result of a fetch call
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchResult {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub aggregators: Vec<AggregateValue>,
}

impl FetchResult {
    pub fn aggregate(&self, id: &str) -> Option<f64> {
        self.aggregators
            .iter()
            .find(|agg| agg.id == id)
            .map(|agg| agg.value)
    }
}

/// Per-record outcome of a batch call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Record>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn ok(data: Option<Record>) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Per-record outcomes of a create/update/delete call
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchResult {
    #[serde(default)]
    pub results: Vec<RecordResult>,
}

impl BatchResult {
    /// Splits the outcome: the first failure wins, successful records stay persisted.
    pub fn into_successes(self, fallback_message: &str) -> Result<Vec<RecordResult>, ServiceError> {
        let (succeeded, failed): (Vec<_>, Vec<_>) =
            self.results.into_iter().partition(|r| r.success);

        if let Some(first) = failed.first() {
            return Err(ServiceError::PartialBatch {
                message: first
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback_message.to_string()),
                succeeded: succeeded.len(),
                failed: failed.len(),
            });
        }

        Ok(succeeded)
    }
}

/// Record store trait for different implementations
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs and health output
    fn backend(&self) -> &'static str;

    async fn fetch_records(&self, table: &str, params: FetchParams) -> Result<FetchResult, ServiceError>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[String],
    ) -> Result<Option<Record>, ServiceError>;

    async fn create_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError>;

    /// Each record must carry its `Id`; only the columns present are written.
    async fn update_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError>;

    async fn delete_records(&self, table: &str, ids: Vec<i64>) -> Result<BatchResult, ServiceError>;
}

pub type SharedRecordStore = Arc<dyn RecordStore>;
