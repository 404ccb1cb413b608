//! Convenience re-exports for common soft-deletable usage
//!
//! # Example
//!
//! ```rust
//! use soft_deletable::prelude::*;
//! ```

pub use crate::core::{SoftDeletable, SoftDeletableConfig, SoftDeletableDecorator};
pub use crate::errors::SoftDeletableError;
pub use crate::handler::SoftDeletableHandler;

pub use config::{AppConfig, EventConfig, OrmConfig};

// Entity trait, ORM, query builder and serde derives
pub use store_object::prelude::*;
pub use store_object;

pub use signal_system::prelude::{
    DatabaseEvent, EventManager, EventSubscriber, EventType, RemovalAction, RemoveEventArgs,
};

// Derive macro shares its name with the `Entity` trait from the store prelude
pub use table_derive::{model, Entity};

// Common external dependencies
pub use anyhow;
pub use chrono;
pub use serde_json::{self, json};
pub use tokio;
pub use uuid::{self, Uuid};
