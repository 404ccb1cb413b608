//! Type-level metadata storage
//!
//! Associates immutable records and named filters with entity types.
//! Entries are written when a type is decorated and read by type identity
//! afterwards.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;

use crate::entity::Entity;
use crate::query_builder::FilterDef;

lazy_static! {
    static ref GLOBAL_METADATA: Arc<MetadataStorage> = Arc::new(MetadataStorage::new());
}

/// Metadata attached to a single entity type
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    name: &'static str,
    filters: Vec<FilterDef>,
    extensions: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl EntityMetadata {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            filters: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn filters(&self) -> &[FilterDef] {
        &self.filters
    }

    pub fn has_extension(&self, key: &str) -> bool {
        self.extensions.contains_key(key)
    }
}

/// Registry of entity metadata keyed by type
#[derive(Debug, Default)]
pub struct MetadataStorage {
    entities: RwLock<HashMap<TypeId, EntityMetadata>>,
}

impl MetadataStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide storage used by ORMs that were not given their own
    pub fn global() -> Arc<MetadataStorage> {
        GLOBAL_METADATA.clone()
    }

    // Entries are immutable once written, so a poisoned lock still holds
    // consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, EntityMetadata>> {
        self.entities.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, EntityMetadata>> {
        self.entities.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach `value` to `E` under `key`, replacing any previous value
    pub fn define<E, M>(&self, key: &'static str, value: M)
    where
        E: Entity,
        M: Any + Send + Sync,
    {
        tracing::trace!(entity = E::entity_name(), key, "defining metadata");
        self.write()
            .entry(TypeId::of::<E>())
            .or_insert_with(|| EntityMetadata::new(E::entity_name()))
            .extensions
            .insert(key, Arc::new(value));
    }

    /// Look up the value stored under `key` for a runtime type
    pub fn get<M>(&self, type_id: TypeId, key: &str) -> Option<Arc<M>>
    where
        M: Any + Send + Sync,
    {
        let value = self.read().get(&type_id)?.extensions.get(key)?.clone();
        value.downcast::<M>().ok()
    }

    pub fn get_for<E, M>(&self, key: &str) -> Option<Arc<M>>
    where
        E: Entity,
        M: Any + Send + Sync,
    {
        self.get(TypeId::of::<E>(), key)
    }

    /// Register a named filter on `E`; a filter with the same name is replaced
    pub fn add_filter<E: Entity>(&self, filter: FilterDef) {
        tracing::trace!(
            entity = E::entity_name(),
            filter = filter.name.as_str(),
            "registering filter"
        );
        let mut entities = self.write();
        let metadata = entities
            .entry(TypeId::of::<E>())
            .or_insert_with(|| EntityMetadata::new(E::entity_name()));

        match metadata.filters.iter_mut().find(|f| f.name == filter.name) {
            Some(existing) => *existing = filter,
            None => metadata.filters.push(filter),
        }
    }

    /// Filters registered for a runtime type
    pub fn filters(&self, type_id: TypeId) -> Vec<FilterDef> {
        self.read()
            .get(&type_id)
            .map(|m| m.filters.clone())
            .unwrap_or_default()
    }

    pub fn filters_for<E: Entity>(&self) -> Vec<FilterDef> {
        self.filters(TypeId::of::<E>())
    }

    /// Snapshot of everything known about a type
    pub fn entity(&self, type_id: TypeId) -> Option<EntityMetadata> {
        self.read().get(&type_id).cloned()
    }

    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.read().contains_key(&type_id)
    }
}
