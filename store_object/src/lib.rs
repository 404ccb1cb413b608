//! Store Object - Core persistence layer for soft-deletable
//!
//! This crate provides the entity contract, type-level metadata storage,
//! query filters, the unit of work and the entity manager that the
//! soft-delete extension plugs into.

pub mod backend;
pub mod entity;
pub mod entity_manager;
pub mod errors;
pub mod metadata;
pub mod orm;
pub mod prelude;
pub mod query_builder;
pub mod unit_of_work;

pub use backend::{MemoryBackend, StorageBackend};
pub use entity::{record_key, value_key, Entity};
pub use entity_manager::{EntityManager, FlushSummary};
pub use errors::StoreError;
pub use metadata::{EntityMetadata, MetadataStorage};
pub use orm::Orm;
pub use query_builder::{FilterDef, FilterSwitch, QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use signal_system::Record;
pub use unit_of_work::{ChangeSet, ChangeSetType, UnitOfWork};
