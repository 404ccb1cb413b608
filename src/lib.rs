//! # soft-deletable
//!
//! Soft delete for entities: removing a decorated entity keeps its row and
//! writes a marker field instead, and a default-enabled filter hides marked
//! rows from queries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use soft_deletable::prelude::*;
//!
//! #[model]
//! #[entity(name = "users")]
//! #[soft_deletable(field = "deleted_at", value = "chrono::Utc::now")]
//! pub struct User {
//!     pub id: Uuid,
//!     pub name: String,
//!     pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orm = Orm::in_memory();
//!     orm.discover::<User>();
//!     SoftDeletable::register(&orm)?;
//!
//!     let mut em = orm.em();
//!     let user = User {
//!         id: Uuid::new_v4(),
//!         name: "John Doe".to_string(),
//!         deleted_at: None,
//!     };
//!     em.persist_and_flush(&user).await?;
//!     em.remove_and_flush(&user).await?;
//!
//!     // hidden by the soft delete filter, still stored
//!     assert!(em.find_by_id::<User, _>(&user.id).await?.is_none());
//!     let all = em.find::<User>(QueryBuilder::new().disable_filters()).await?;
//!     assert_eq!(all.len(), 1);
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod handler;
pub mod metadata;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::{SoftDeletable, SoftDeletableConfig, SoftDeletableDecorator};
pub use errors::SoftDeletableError;
pub use handler::SoftDeletableHandler;
pub use metadata::{
    SoftDeletableMetadata, ValueFn, SOFT_DELETABLE, SOFT_DELETABLE_FILTER, SOFT_DELETABLE_HANDLER,
};

// Re-export centralized config
pub use config::{AppConfig, EventConfig, OrmConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use signal_system;
pub use store_object;
pub use table_derive;
pub use table_derive::{model, Entity};

// Re-export external dependencies used in public API
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use uuid;
