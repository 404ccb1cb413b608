//! Storage backends
//!
//! A backend stores records per entity name and commits resolved change
//! sets atomically.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::unit_of_work::{ChangeSet, ChangeSetType};
use crate::Record;

#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// All stored records of an entity
    async fn fetch(&self, entity_name: &str) -> Result<Vec<Record>, StoreError>;

    /// Whether a record with this key is stored
    async fn exists(&self, entity_name: &str, id: &str) -> Result<bool, StoreError>;

    /// Apply every change set or none of them
    async fn commit(&self, change_sets: &[ChangeSet]) -> Result<(), StoreError>;
}

type Table = BTreeMap<String, Record>;

/// In-process backend keeping each entity as an ordered map of records
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows of an entity, including soft-deleted ones
    pub async fn row_count(&self, entity_name: &str) -> usize {
        self.tables
            .read()
            .await
            .get(entity_name)
            .map(|t| t.len())
            .unwrap_or(0)
    }

    /// Raw stored record, bypassing every filter
    pub async fn raw(&self, entity_name: &str, id: &str) -> Option<Record> {
        self.tables
            .read()
            .await
            .get(entity_name)
            .and_then(|t| t.get(id))
            .cloned()
    }

    fn apply(table: &mut Table, change_set: &ChangeSet) -> Result<(), StoreError> {
        match change_set.kind {
            ChangeSetType::Create => {
                if table.contains_key(&change_set.id) {
                    return Err(StoreError::Conflict {
                        entity: change_set.entity_name.to_string(),
                        id: change_set.id.clone(),
                    });
                }
                table.insert(change_set.id.clone(), change_set.payload.clone());
            }
            ChangeSetType::Update => {
                let row = table.get_mut(&change_set.id).ok_or_else(|| {
                    StoreError::NotFound {
                        entity: change_set.entity_name.to_string(),
                        id: change_set.id.clone(),
                    }
                })?;
                for (field, value) in &change_set.payload {
                    row.insert(field.clone(), value.clone());
                }
            }
            ChangeSetType::Delete => {
                if table.remove(&change_set.id).is_none() {
                    return Err(StoreError::NotFound {
                        entity: change_set.entity_name.to_string(),
                        id: change_set.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn fetch(&self, entity_name: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(entity_name)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn exists(&self, entity_name: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(entity_name)
            .is_some_and(|t| t.contains_key(id)))
    }

    async fn commit(&self, change_sets: &[ChangeSet]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        // Stage copies of the touched tables and swap them in only when the
        // whole batch applied cleanly.
        let mut staged: HashMap<String, Table> = HashMap::new();
        for change_set in change_sets {
            let table = match staged.entry(change_set.entity_name.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let current = tables.get(change_set.entity_name).cloned().unwrap_or_default();
                    entry.insert(current)
                }
            };
            Self::apply(table, change_set)?;
        }

        tracing::trace!(
            change_sets = change_sets.len(),
            tables = staged.len(),
            "memory backend commit"
        );
        tables.extend(staged);
        Ok(())
    }
}
