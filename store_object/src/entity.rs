//! Entity trait
//!
//! This module defines the contract every persisted type implements.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

use crate::errors::StoreError;
use crate::metadata::MetadataStorage;
use crate::Record;

/// A persistence-managed type.
///
/// Usually derived with `#[derive(Entity)]`:
/// ```ignore
/// #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
/// #[entity(name = "users")]
/// pub struct User {
///     pub id: Uuid,
///     pub name: String,
/// }
/// ```
pub trait Entity: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static {
    /// Storage name of this entity
    fn entity_name() -> &'static str;

    /// Field holding the primary key
    fn primary_key_field() -> &'static str {
        "id"
    }

    /// Type-definition hook, run when the entity is discovered by an ORM.
    ///
    /// Decorators attach their metadata and filters here.
    fn decorate(_metadata: &MetadataStorage) {}

    /// Serialize into a stored record
    fn to_record(&self) -> Result<Record, StoreError> {
        match serde_json::to_value(self)
            .map_err(|e| StoreError::serialization(Self::entity_name(), e))?
        {
            Value::Object(record) => Ok(record),
            other => Err(StoreError::SerializationError(format!(
                "{}: expected an object, got {}",
                Self::entity_name(),
                other
            ))),
        }
    }

    /// Deserialize from a stored record
    fn from_record(record: Record) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| StoreError::serialization(Self::entity_name(), e))
    }

    /// Primary key rendered as a storage key
    fn primary_key(&self) -> Result<String, StoreError> {
        let record = self.to_record()?;
        record_key(Self::entity_name(), Self::primary_key_field(), &record)
    }
}

/// Extract the storage key of `field` from a record
pub fn record_key(entity: &str, field: &str, record: &Record) -> Result<String, StoreError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(StoreError::validation(
            entity,
            field,
            "primary key is missing",
        )),
        Some(value) => Ok(value_key(value)),
    }
}

/// Render a value as a storage key; strings are used verbatim
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
