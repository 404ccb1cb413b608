//! Type definitions for signal system
//!
//! This module contains the record representation shared with the
//! persistence layer and the callback/error types of the event manager.

use crate::event::DatabaseEvent;
use std::sync::Arc;
use thiserror::Error;

/// Column name to value map describing one stored entity
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Post-commit event callback
pub type EventCallback = Arc<dyn Fn(&DatabaseEvent) + Send + Sync>;

/// Event processing error
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Subscriber limit of {limit} reached, cannot register '{subscriber}'")]
    SubscriberLimit { subscriber: String, limit: usize },

    #[error("Subscriber '{subscriber}' failed during {hook}: {source}")]
    Subscriber {
        subscriber: String,
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Event manager lock poisoned")]
    LockPoisoned,
}
