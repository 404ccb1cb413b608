//! Entity manager
//!
//! Front door of the persistence layer: queues changes in a unit of work,
//! runs lifecycle subscribers during flush and reads entities through the
//! registered filters.

use serde::Serialize;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use config::AppConfig;
use signal_system::{DatabaseEvent, EventManager, EventType, RemovalAction, RemoveEventArgs};

use crate::backend::StorageBackend;
use crate::entity::{value_key, Entity};
use crate::errors::StoreError;
use crate::metadata::MetadataStorage;
use crate::query_builder::{QueryBuilder, QueryFilter};
use crate::unit_of_work::{ChangeSet, ChangeSetType, PendingEntity, PendingOperation, UnitOfWork};

/// Keys written by one flush, grouped by outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    /// Removals that subscribers turned into updates
    pub soft_deleted: Vec<String>,
}

impl FlushSummary {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.deleted.is_empty()
            && self.soft_deleted.is_empty()
    }
}

pub struct EntityManager {
    backend: Arc<dyn StorageBackend>,
    events: Arc<EventManager>,
    metadata: Arc<MetadataStorage>,
    config: Arc<AppConfig>,
    unit_of_work: UnitOfWork,
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("orm", &self.config.orm.name)
            .field("pending", &self.unit_of_work.len())
            .field("events", &self.events)
            .finish()
    }
}

impl EntityManager {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        events: Arc<EventManager>,
        metadata: Arc<MetadataStorage>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            backend,
            events,
            metadata,
            config,
            unit_of_work: UnitOfWork::new(),
        }
    }

    /// New manager sharing storage, metadata and events, with an empty unit of work
    pub fn fork(&self) -> Self {
        Self::new(
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

    /// Number of operations waiting for the next flush
    pub fn pending(&self) -> usize {
        self.unit_of_work.len()
    }

    /// Queue an insert or update of `entity`
    pub fn persist<E: Entity>(&mut self, entity: &E) -> Result<&mut Self, StoreError> {
        self.unit_of_work.persist(entity)?;
        Ok(self)
    }

    /// Queue the removal of `entity`
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<&mut Self, StoreError> {
        self.unit_of_work.remove(entity)?;
        Ok(self)
    }

    /// Drop every queued operation
    pub fn clear(&mut self) {
        self.unit_of_work.clear();
    }

    pub async fn persist_and_flush<E: Entity>(
        &mut self,
        entity: &E,
    ) -> Result<FlushSummary, StoreError> {
        self.persist(entity)?;
        self.flush().await
    }

    pub async fn remove_and_flush<E: Entity>(
        &mut self,
        entity: &E,
    ) -> Result<FlushSummary, StoreError> {
        self.remove(entity)?;
        self.flush().await
    }

    /// Commit the unit of work.
    ///
    /// On failure nothing reaches storage, no signals are emitted and the
    /// queued operations stay pending so the flush can be retried.
    pub async fn flush(&mut self) -> Result<FlushSummary, StoreError> {
        let operations = self.unit_of_work.take();
        if operations.is_empty() {
            return Ok(FlushSummary::default());
        }

        match self.commit_operations(operations.clone()).await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                tracing::debug!(error = %err, "flush failed, keeping operations queued");
                self.unit_of_work.restore(operations);
                Err(err)
            }
        }
    }

    async fn commit_operations(
        &self,
        operations: Vec<PendingOperation>,
    ) -> Result<FlushSummary, StoreError> {
        tracing::debug!(
            orm = self.config.orm.name.as_str(),
            operations = operations.len(),
            "flushing unit of work"
        );

        let mut created: HashSet<(TypeId, String)> = HashSet::new();
        let mut change_sets = Vec::with_capacity(operations.len());
        for operation in operations {
            let change_set = match operation {
                PendingOperation::Persist(pending) => {
                    let key = (pending.entity_type, pending.id.clone());
                    let exists = created.contains(&key)
                        || self.backend.exists(pending.entity_name, &pending.id).await?;
                    if !exists {
                        created.insert(key);
                    }
                    Self::persist_change(pending, exists)
                }
                PendingOperation::Remove(pending) => self.resolve_removal(pending)?,
            };
            change_sets.push(change_set);
        }

        self.backend.commit(&change_sets).await?;

        let mut summary = FlushSummary::default();
        for change_set in change_sets {
            let event_type = match change_set.kind {
                ChangeSetType::Create => {
                    summary.created.push(change_set.id.clone());
                    EventType::Create
                }
                ChangeSetType::Update if change_set.replaces_removal => {
                    summary.soft_deleted.push(change_set.id.clone());
                    EventType::Update
                }
                ChangeSetType::Update => {
                    summary.updated.push(change_set.id.clone());
                    EventType::Update
                }
                ChangeSetType::Delete => {
                    summary.deleted.push(change_set.id.clone());
                    EventType::Delete
                }
            };

            self.events.emit(
                DatabaseEvent::new(event_type, change_set.entity_name.to_string())
                    .with_record_id(change_set.id)
                    .with_payload(change_set.payload),
            );
        }

        tracing::debug!(
            created = summary.created.len(),
            updated = summary.updated.len(),
            deleted = summary.deleted.len(),
            soft_deleted = summary.soft_deleted.len(),
            "flush committed"
        );
        Ok(summary)
    }

    fn persist_change(pending: PendingEntity, exists: bool) -> ChangeSet {
        ChangeSet {
            entity_type: pending.entity_type,
            entity_name: pending.entity_name,
            id: pending.id,
            kind: if exists {
                ChangeSetType::Update
            } else {
                ChangeSetType::Create
            },
            payload: pending.record,
            replaces_removal: false,
        }
    }

    /// Run `before_remove` subscribers and turn the removal into either a
    /// delete or a substituted update
    fn resolve_removal(&self, pending: PendingEntity) -> Result<ChangeSet, StoreError> {
        let mut args = RemoveEventArgs::new(
            pending.entity_type,
            pending.entity_name,
            &pending.id,
            &pending.record,
        );
        self.events.dispatch_before_remove(&mut args)?;
        let action = args.into_action();

        match action {
            RemovalAction::Delete => Ok(ChangeSet {
                entity_type: pending.entity_type,
                entity_name: pending.entity_name,
                id: pending.id,
                kind: ChangeSetType::Delete,
                payload: pending.record,
                replaces_removal: false,
            }),
            RemovalAction::Update(changes) => {
                if self.config.orm.strict_fields {
                    if let Some(field) = changes.keys().find(|f| !pending.record.contains_key(*f)) {
                        return Err(StoreError::validation(
                            pending.entity_name,
                            field,
                            "field does not exist on entity",
                        ));
                    }
                }

                tracing::debug!(
                    entity = pending.entity_name,
                    id = pending.id.as_str(),
                    "removal replaced by update"
                );
                // only the substituted fields are written
                Ok(ChangeSet {
                    entity_type: pending.entity_type,
                    entity_name: pending.entity_name,
                    id: pending.id,
                    kind: ChangeSetType::Update,
                    payload: changes,
                    replaces_removal: true,
                })
            }
        }
    }

    /// Entities matching `query` and the active entity filters
    pub async fn find<E: Entity>(&self, query: QueryBuilder) -> Result<Vec<E>, StoreError> {
        let records = self.backend.fetch(E::entity_name()).await?;
        let filters = self.metadata.filters_for::<E>();
        tracing::trace!(
            entity = E::entity_name(),
            candidates = records.len(),
            filters = filters.len(),
            "find"
        );

        query
            .execute(records, &filters)
            .into_iter()
            .map(E::from_record)
            .collect()
    }

    pub async fn find_one<E: Entity>(
        &self,
        query: QueryBuilder,
    ) -> Result<Option<E>, StoreError> {
        Ok(self.find(query.limit(1)).await?.into_iter().next())
    }

    /// Entity by primary key, subject to the default filters
    pub async fn find_by_id<E: Entity, I: Serialize>(
        &self,
        id: &I,
    ) -> Result<Option<E>, StoreError> {
        self.find_by_id_with(id, QueryBuilder::new()).await
    }

    /// Entity by primary key with the filter switch of `query`
    pub async fn find_by_id_with<E: Entity, I: Serialize>(
        &self,
        id: &I,
        query: QueryBuilder,
    ) -> Result<Option<E>, StoreError> {
        let id = serde_json::to_value(id)
            .map_err(|e| StoreError::serialization(E::entity_name(), e))?;
        tracing::trace!(entity = E::entity_name(), id = value_key(&id).as_str(), "find_by_id");
        self.find_one(query.filter(QueryFilter::eq(E::primary_key_field(), id)))
            .await
    }

    pub async fn count<E: Entity>(&self, query: QueryBuilder) -> Result<usize, StoreError> {
        let records = self.backend.fetch(E::entity_name()).await?;
        let filters = self.metadata.filters_for::<E>();
        Ok(query.execute(records, &filters).len())
    }
}
