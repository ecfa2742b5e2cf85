use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument, warn};

use super::{
    AggregateValue, BatchResult, FetchParams, FetchResult, FieldSelector, Record, RecordResult,
    RecordStore,
};
use crate::errors::ServiceError;

const PROJECT_HEADER: &str = "x-project-id";

/// Connection settings for the hosted record store
#[derive(Debug, Clone)]
pub struct RemoteStoreSettings {
    pub base_url: String,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout: Duration,
}

/// Response envelope shared by every record-store endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    aggregators: Vec<AggregateValue>,
    #[serde(default)]
    results: Option<Vec<RecordResult>>,
}

#[derive(Serialize)]
struct GetRequest {
    id: i64,
    fields: Vec<FieldSelector>,
}

#[derive(Serialize)]
struct RecordsRequest {
    records: Vec<Record>,
}

#[derive(Serialize)]
struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    record_ids: Vec<i64>,
}

/// HTTP client for the hosted record store.
///
/// One instance is built at startup and shared by every repository.
#[derive(Clone)]
pub struct RemoteRecordStore {
    client: Client,
    base_url: String,
}

impl RemoteRecordStore {
    pub fn new(settings: RemoteStoreSettings) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(project_id) = settings.project_id.as_deref() {
            let value = HeaderValue::from_str(project_id)
                .map_err(|e| ServiceError::InternalError(format!("invalid project id: {}", e)))?;
            headers.insert(PROJECT_HEADER, value);
        }
        if let Some(key) = settings.public_key.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ServiceError::InternalError(format!("invalid public key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, table: &str, verb: &str) -> String {
        format!("{}/tables/{}/{}", self.base_url, table, verb)
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        table: &str,
        verb: &str,
        body: &B,
    ) -> Result<Envelope, ServiceError> {
        let url = self.endpoint(table, verb);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(table, verb, error = %e, "record store request failed");
            ServiceError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: Option<Envelope> = serde_json::from_slice(&bytes).ok();

        match envelope {
            Some(envelope) if envelope.success => Ok(envelope),
            Some(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| format!("Record store rejected {} on {}", verb, table));
                error!(table, verb, %status, %message, "record store reported failure");
                Err(ServiceError::FetchError(message))
            }
            None if status.is_success() => Err(ServiceError::SerializationError(format!(
                "unreadable {} response for {}",
                verb, table
            ))),
            None => {
                error!(table, verb, %status, "record store returned an error status");
                Err(ServiceError::FetchError(format!(
                    "Record store returned {} for {} on {}",
                    status, verb, table
                )))
            }
        }
    }
}

fn decode_data<T: DeserializeOwned + Default>(data: Option<serde_json::Value>) -> Result<T, ServiceError> {
    match data {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

fn into_batch(envelope: Envelope) -> BatchResult {
    BatchResult {
        results: envelope.results.unwrap_or_default(),
    }
}

#[async_trait]
impl RecordStore for RemoteRecordStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    #[instrument(skip(self, params), fields(backend = "remote"))]
    async fn fetch_records(&self, table: &str, params: FetchParams) -> Result<FetchResult, ServiceError> {
        let envelope = self.call(table, "fetch", &params).await?;
        Ok(FetchResult {
            total: envelope.total,
            aggregators: envelope.aggregators,
            data: decode_data(envelope.data)?,
        })
    }

    #[instrument(skip(self, fields), fields(backend = "remote"))]
    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[String],
    ) -> Result<Option<Record>, ServiceError> {
        let request = GetRequest {
            id,
            fields: fields.iter().map(FieldSelector::new).collect(),
        };
        let envelope = self.call(table, "get", &request).await?;
        decode_data(envelope.data)
    }

    #[instrument(skip(self, records), fields(backend = "remote", count = records.len()))]
    async fn create_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError> {
        let envelope = self.call(table, "create", &RecordsRequest { records }).await?;
        Ok(into_batch(envelope))
    }

    #[instrument(skip(self, records), fields(backend = "remote", count = records.len()))]
    async fn update_records(&self, table: &str, records: Vec<Record>) -> Result<BatchResult, ServiceError> {
        let envelope = self.call(table, "update", &RecordsRequest { records }).await?;
        Ok(into_batch(envelope))
    }

    #[instrument(skip(self), fields(backend = "remote"))]
    async fn delete_records(&self, table: &str, ids: Vec<i64>) -> Result<BatchResult, ServiceError> {
        let envelope = self
            .call(table, "delete", &DeleteRequest { record_ids: ids })
            .await?;
        Ok(into_batch(envelope))
    }
}
