//! Database event types and definitions
//!
//! This module defines the structure of the post-commit events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};

use crate::types::Record;

/// Database event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Create,
    Update,
    Delete,
}

/// Database event emitted once a change set has been committed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseEvent {
    /// Event type
    pub event_type: EventType,
    /// Entity name
    pub entity_name: String,
    /// Record ID (if available)
    pub record_id: Option<String>,
    /// Committed field values
    pub payload: Record,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DatabaseEvent {
    pub fn new(event_type: EventType, entity_name: String) -> Self {
        Self {
            event_type,
            entity_name,
            record_id: None,
            payload: Record::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_record_id(mut self, record_id: String) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn with_payload(mut self, payload: Record) -> Self {
        self.payload = payload;
        self
    }
}
