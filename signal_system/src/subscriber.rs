//! Lifecycle subscribers
//!
//! Subscribers are invoked synchronously while a unit of work is being
//! flushed, before anything reaches storage.

use serde_json::Value;
use std::any::TypeId;

use crate::types::Record;

/// What the persistence layer does with a pending removal
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalAction {
    /// Physically remove the row
    Delete,
    /// Keep the row and write these field values instead
    Update(Record),
}

/// Cancelable context handed to `EventSubscriber::before_remove`
#[derive(Debug)]
pub struct RemoveEventArgs<'a> {
    entity_type: TypeId,
    entity_name: &'a str,
    entity_id: &'a str,
    record: &'a Record,
    action: RemovalAction,
}

impl<'a> RemoveEventArgs<'a> {
    pub fn new(
        entity_type: TypeId,
        entity_name: &'a str,
        entity_id: &'a str,
        record: &'a Record,
    ) -> Self {
        Self {
            entity_type,
            entity_name,
            entity_id,
            record,
            action: RemovalAction::Delete,
        }
    }

    /// Runtime type of the entity being removed
    pub fn entity_type(&self) -> TypeId {
        self.entity_type
    }

    pub fn entity_name(&self) -> &str {
        self.entity_name
    }

    pub fn entity_id(&self) -> &str {
        self.entity_id
    }

    /// Stored values of the entity as queued for removal
    pub fn record(&self) -> &Record {
        self.record
    }

    pub fn action(&self) -> &RemovalAction {
        &self.action
    }

    pub fn into_action(self) -> RemovalAction {
        self.action
    }

    /// Whether the physical removal has been replaced by an update
    pub fn is_cancelled(&self) -> bool {
        matches!(self.action, RemovalAction::Update(_))
    }

    /// Cancel the physical removal and write `field = value` instead.
    ///
    /// Calling this more than once accumulates field changes; a later value
    /// for the same field wins.
    pub fn cancel_and_update(&mut self, field: impl Into<String>, value: Value) {
        match &mut self.action {
            RemovalAction::Delete => {
                let mut changes = Record::new();
                changes.insert(field.into(), value);
                self.action = RemovalAction::Update(changes);
            }
            RemovalAction::Update(changes) => {
                changes.insert(field.into(), value);
            }
        }
    }
}

/// Listener attached to an `EventManager`
pub trait EventSubscriber: Send + Sync {
    /// Identifier used to detect duplicate registrations
    fn name(&self) -> &str;

    /// Entity names this subscriber wants; `None` means every entity
    fn subscribed_entities(&self) -> Option<Vec<&'static str>> {
        None
    }

    /// Called for every entity about to be removed during a flush
    fn before_remove(&self, _args: &mut RemoveEventArgs<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}
