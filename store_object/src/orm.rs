//! ORM handle
//!
//! Owns the shared pieces of one persistence engine instance: storage
//! backend, metadata storage, lifecycle event manager and configuration.

use std::sync::Arc;

use config::AppConfig;
use signal_system::EventManager;

use crate::backend::{MemoryBackend, StorageBackend};
use crate::entity::Entity;
use crate::entity_manager::EntityManager;
use crate::errors::StoreError;
use crate::metadata::MetadataStorage;

/// Main ORM coordinator
pub struct Orm {
    config: Arc<AppConfig>,
    backend: Arc<dyn StorageBackend>,
    events: Arc<EventManager>,
    metadata: Arc<MetadataStorage>,
}

impl std::fmt::Debug for Orm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orm")
            .field("name", &self.config.orm.name)
            .field("backend", &self.backend)
            .field("events", &self.events)
            .finish()
    }
}

impl Orm {
    /// Create a new ORM over `backend`, reading the process-wide metadata storage
    pub fn init(config: AppConfig, backend: Arc<dyn StorageBackend>) -> Result<Self, StoreError> {
        config
            .validate()
            .map_err(|e| StoreError::InvalidConfiguration {
                message: e.to_string(),
            })?;

        tracing::debug!(orm = config.orm.name.as_str(), "initializing ORM");
        let events = Arc::new(EventManager::new(config.events.clone()));
        Ok(Self {
            config: Arc::new(config),
            backend,
            events,
            metadata: MetadataStorage::global(),
        })
    }

    /// ORM with default configuration over a fresh `MemoryBackend`
    pub fn in_memory() -> Self {
        let config = AppConfig::default();
        Self {
            events: Arc::new(EventManager::new(config.events.clone())),
            config: Arc::new(config),
            backend: Arc::new(MemoryBackend::new()),
            metadata: MetadataStorage::global(),
        }
    }

    /// Use an isolated metadata storage instead of the process-wide one
    pub fn with_metadata(mut self, metadata: Arc<MetadataStorage>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Run the type-definition hook of `E` against this ORM's metadata
    pub fn discover<E: Entity>(&self) -> &Self {
        tracing::debug!(entity = E::entity_name(), "discovering entity");
        E::decorate(&self.metadata);
        self
    }

    /// Fresh entity manager with its own unit of work
    pub fn em(&self) -> EntityManager {
        EntityManager::new(
            self.backend.clone(),
            self.events.clone(),
            self.metadata.clone(),
            self.config.clone(),
        )
    }

    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.events
    }

    pub fn metadata(&self) -> &Arc<MetadataStorage> {
        &self.metadata
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
