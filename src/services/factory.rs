use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::adapter::TableMapping;
use crate::config::{RecordStoreConfig, StoreBackend};
use crate::entities::Entity;
use crate::errors::ServiceError;
use crate::repositories::Repository;
use crate::store::remote::RemoteRecordStore;
use crate::store::{seed, InMemoryRecordStore, SharedRecordStore};

/// Builds repositories that share one client per backend.
///
/// Which store serves a table is decided here, once, from configuration;
/// a repository never switches between stores.
pub struct RepositoryFactory {
    config: RecordStoreConfig,
    memory: Arc<InMemoryRecordStore>,
    remote: Option<SharedRecordStore>,
}

impl RepositoryFactory {
    pub fn new(config: RecordStoreConfig) -> Result<Self, ServiceError> {
        let remote: Option<SharedRecordStore> = match config.backend {
            StoreBackend::Remote => {
                let settings = config.remote_settings().ok_or_else(|| {
                    ServiceError::InvalidOperation(
                        "record_store.base_url is required for the remote backend".to_string(),
                    )
                })?;
                info!(base_url = %settings.base_url, "using remote record store");
                Some(Arc::new(RemoteRecordStore::new(settings)?))
            }
            StoreBackend::InMemory => None,
        };

        Ok(Self {
            memory: Arc::new(InMemoryRecordStore::with_latency(config.simulated_latency())),
            remote,
            config,
        })
    }

    /// Serves every table from `store`, ignoring the configured backend.
    pub fn with_store(config: RecordStoreConfig, store: SharedRecordStore) -> Self {
        Self {
            memory: Arc::new(InMemoryRecordStore::with_latency(config.simulated_latency())),
            remote: Some(store),
            config: RecordStoreConfig {
                backend: StoreBackend::Remote,
                fallback_tables: Vec::new(),
                ..config
            },
        }
    }

    pub fn memory_store(&self) -> &Arc<InMemoryRecordStore> {
        &self.memory
    }

    /// Table mapping with the configured naming convention
    pub fn mapping<E: Entity>(&self) -> TableMapping {
        let schema = E::schema();
        let convention = self
            .config
            .convention_for(schema.table)
            .unwrap_or(schema.convention);
        TableMapping::new(schema, convention)
    }

    fn store_for(&self, table: &str) -> SharedRecordStore {
        match (self.config.backend_for(table), &self.remote) {
            (StoreBackend::Remote, Some(remote)) => Arc::clone(remote),
            _ => self.memory.clone() as SharedRecordStore,
        }
    }

    pub fn repository<E: Entity>(&self) -> Repository<E> {
        let mapping = self.mapping::<E>();
        let store = self.store_for(mapping.table());
        info!(
            table = mapping.table(),
            backend = store.backend(),
            convention = %mapping.convention(),
            "repository ready"
        );
        Repository::new(store, mapping, self.config.page_size)
    }

    /// Seeds the demo rows of `E` when its table is served from memory.
    pub async fn seed<E: Entity>(&self, today: NaiveDate) -> Result<usize, ServiceError> {
        let mapping = self.mapping::<E>();
        if !self.config.seed_fallback
            || self.config.backend_for(mapping.table()) != StoreBackend::InMemory
        {
            return Ok(0);
        }
        seed::seed_table(&self.memory, &mapping, today).await
    }
}
