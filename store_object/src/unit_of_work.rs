//! Unit of work
//!
//! Queues entity operations until the owning entity manager flushes them
//! as one atomic batch.

use std::any::TypeId;

use crate::entity::{record_key, Entity};
use crate::errors::StoreError;
use crate::Record;

/// Kind of change written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSetType {
    Create,
    Update,
    Delete,
}

/// One resolved change, ready for the storage backend
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub entity_type: TypeId,
    pub entity_name: &'static str,
    pub id: String,
    pub kind: ChangeSetType,
    pub payload: Record,
    /// Set when a removal was turned into this update by a subscriber
    pub replaces_removal: bool,
}

/// Snapshot of an entity queued for persisting or removal
#[derive(Debug, Clone)]
pub struct PendingEntity {
    pub entity_type: TypeId,
    pub entity_name: &'static str,
    pub id: String,
    pub record: Record,
}

impl PendingEntity {
    fn capture<E: Entity>(entity: &E) -> Result<Self, StoreError> {
        let record = entity.to_record()?;
        let id = record_key(E::entity_name(), E::primary_key_field(), &record)?;
        Ok(Self {
            entity_type: TypeId::of::<E>(),
            entity_name: E::entity_name(),
            id,
            record,
        })
    }

    fn same_entity(&self, other: &PendingEntity) -> bool {
        self.entity_type == other.entity_type && self.id == other.id
    }
}

#[derive(Debug, Clone)]
pub enum PendingOperation {
    Persist(PendingEntity),
    Remove(PendingEntity),
}

#[derive(Debug, Default)]
pub struct UnitOfWork {
    operations: Vec<PendingOperation>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert or update.
    ///
    /// A second persist of the same entity before the next flush replaces the
    /// first snapshot. Persisting an entity whose removal is queued cancels
    /// that removal.
    pub fn persist<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError> {
        let pending = PendingEntity::capture(entity)?;
        self.operations.retain(|op| {
            !matches!(op, PendingOperation::Remove(queued) if queued.same_entity(&pending))
        });

        let existing = self.operations.iter_mut().find(|op| {
            matches!(op, PendingOperation::Persist(queued) if queued.same_entity(&pending))
        });

        match existing {
            Some(op) => *op = PendingOperation::Persist(pending),
            None => self.operations.push(PendingOperation::Persist(pending)),
        }
        Ok(())
    }

    /// Queue a removal
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError> {
        let pending = PendingEntity::capture(entity)?;
        let already_queued = self.operations.iter().any(|op| {
            matches!(op, PendingOperation::Remove(queued) if queued.same_entity(&pending))
        });

        if !already_queued {
            self.operations.push(PendingOperation::Remove(pending));
        }
        Ok(())
    }

    /// Drain every queued operation in order
    pub fn take(&mut self) -> Vec<PendingOperation> {
        std::mem::take(&mut self.operations)
    }

    /// Put drained operations back ahead of anything queued since
    pub fn restore(&mut self, mut operations: Vec<PendingOperation>) {
        operations.append(&mut self.operations);
        self.operations = operations;
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }
}
