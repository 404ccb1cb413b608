//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::entity::Entity;

// Error types
pub use crate::errors::StoreError;

// Engine
pub use crate::backend::{MemoryBackend, StorageBackend};
pub use crate::entity_manager::{EntityManager, FlushSummary};
pub use crate::metadata::MetadataStorage;
pub use crate::orm::Orm;

// Query building
pub use crate::query_builder::{FilterDef, QueryBuilder, QueryFilter, SortOrder};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
