//! Soft-delete metadata record
//!
//! The record stored on a decorated entity type and read back by the
//! deletion handler.

use serde_json::Value;
use std::sync::Arc;

/// Key of the soft-delete record in `MetadataStorage`
pub const SOFT_DELETABLE: &str = "soft_deletable";

/// Name of the standing filter hiding deleted records
pub const SOFT_DELETABLE_FILTER: &str = "soft_deletable";

/// Subscriber name of `SoftDeletableHandler`
pub const SOFT_DELETABLE_HANDLER: &str = "soft_deletable_handler";

/// Produces the value written to the marker field on deletion
pub type ValueFn = Arc<dyn Fn() -> Result<Value, serde_json::Error> + Send + Sync>;

/// Which field marks deletion and how its deleted value is computed
#[derive(Clone)]
pub struct SoftDeletableMetadata {
    field: String,
    value: ValueFn,
}

impl std::fmt::Debug for SoftDeletableMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftDeletableMetadata")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl SoftDeletableMetadata {
    pub fn new(field: String, value: ValueFn) -> Self {
        Self { field, value }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Compute the deleted value now
    pub fn value(&self) -> Result<Value, serde_json::Error> {
        (self.value)()
    }
}
