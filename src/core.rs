//! Core soft-deletable functionality
//!
//! `SoftDeletable` marks entity types as soft-deletable and attaches the
//! deletion handler to an ORM.

use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use store_object::{Entity, FilterDef, MetadataStorage, Orm, QueryFilter};

use crate::errors::SoftDeletableError;
use crate::handler::SoftDeletableHandler;
use crate::metadata::{SoftDeletableMetadata, ValueFn, SOFT_DELETABLE, SOFT_DELETABLE_FILTER};

/// Soft-delete configuration of entity type `E`
pub struct SoftDeletableConfig<E> {
    field: String,
    value: ValueFn,
    value_initial: Value,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SoftDeletableConfig<E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            value: self.value.clone(),
            value_initial: self.value_initial.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for SoftDeletableConfig<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftDeletableConfig")
            .field("entity", &std::any::type_name::<E>())
            .field("field", &self.field)
            .field("value_initial", &self.value_initial)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> SoftDeletableConfig<E> {
    /// `field` marks deletion; `value` is called on every deletion to
    /// produce the value written to it
    pub fn new<F, V>(field: impl Into<String>, value: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Serialize,
    {
        Self {
            field: field.into(),
            value: Arc::new(move || serde_json::to_value(value())),
            value_initial: Value::Null,
            _entity: PhantomData,
        }
    }

    /// Value of a record that is not deleted. Defaults to null.
    pub fn with_value_initial(mut self, value_initial: impl Into<Value>) -> Self {
        self.value_initial = value_initial.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value_initial(&self) -> &Value {
        &self.value_initial
    }
}

/// Type modifier produced by `SoftDeletable::with_config` or `with_args`
#[derive(Debug, Clone)]
pub struct SoftDeletableDecorator<E> {
    config: SoftDeletableConfig<E>,
}

impl<E: Entity> SoftDeletableDecorator<E> {
    /// Standing filter matching records that are not deleted
    pub fn filter(&self) -> FilterDef {
        FilterDef::new(
            SOFT_DELETABLE_FILTER,
            QueryFilter::eq(&self.config.field, self.config.value_initial.clone()),
            true,
        )
    }

    /// Store the soft-delete metadata on `E` and register its filter.
    ///
    /// Applying again replaces both; nothing is duplicated.
    pub fn apply(&self, metadata: &MetadataStorage) {
        crate::debug_log!(
            entity = E::entity_name(),
            field = self.config.field.as_str(),
            "decorating entity as soft-deletable"
        );
        metadata.define::<E, _>(
            SOFT_DELETABLE,
            SoftDeletableMetadata::new(self.config.field.clone(), self.config.value.clone()),
        );
        metadata.add_filter::<E>(self.filter());
    }

    /// Apply against the process-wide metadata storage
    pub fn apply_global(&self) {
        self.apply(&MetadataStorage::global());
    }

    pub fn config(&self) -> &SoftDeletableConfig<E> {
        &self.config
    }
}

/// Entry point of the soft-delete extension
pub struct SoftDeletable;

impl SoftDeletable {
    /// Decorator from a structured configuration
    pub fn with_config<E: Entity>(config: SoftDeletableConfig<E>) -> SoftDeletableDecorator<E> {
        SoftDeletableDecorator { config }
    }

    /// Decorator from positional arguments; the entity type parameter takes
    /// the place of the type argument.
    ///
    /// Fails unless both `field` (non-empty) and `value` are given.
    pub fn with_args<E, F, V>(
        field: Option<&str>,
        value: Option<F>,
        value_initial: Option<Value>,
    ) -> Result<SoftDeletableDecorator<E>, SoftDeletableError>
    where
        E: Entity,
        F: Fn() -> V + Send + Sync + 'static,
        V: Serialize,
    {
        let (field, value) = match (field, value) {
            (Some(field), Some(value)) if !field.is_empty() => (field, value),
            (field, value) => {
                return Err(SoftDeletableError::InvalidArguments(format!(
                    "{} requires a field and a value (field given: {}, value given: {})",
                    E::entity_name(),
                    field.is_some_and(|f| !f.is_empty()),
                    value.is_some()
                )))
            }
        };

        let mut config = SoftDeletableConfig::<E>::new(field, value);
        if let Some(value_initial) = value_initial {
            config = config.with_value_initial(value_initial);
        }
        Ok(Self::with_config(config))
    }

    /// Attach the deletion handler to the event manager of `orm`.
    ///
    /// Returns `false` when the handler was already attached (with
    /// subscriber deduplication enabled, the default).
    pub fn register(orm: &Orm) -> Result<bool, SoftDeletableError> {
        let handler = SoftDeletableHandler::new(orm.metadata().clone());
        let registered = orm.event_manager().register_subscriber(Arc::new(handler))?;
        crate::debug_log!(
            orm = orm.config().orm.name.as_str(),
            registered,
            "soft delete handler registration"
        );
        Ok(registered)
    }

    /// Soft-delete metadata of `E`, if decorated
    pub fn metadata_for<E: Entity>(metadata: &MetadataStorage) -> Option<Arc<SoftDeletableMetadata>> {
        metadata.get_for::<E, SoftDeletableMetadata>(SOFT_DELETABLE)
    }

    pub fn is_soft_deletable<E: Entity>(metadata: &MetadataStorage) -> bool {
        Self::metadata_for::<E>(metadata).is_some()
    }
}
