//! Deletion handler
//!
//! Subscriber that turns the removal of a soft-deletable entity into an
//! update of its marker field.

use anyhow::Context;
use std::sync::Arc;

use signal_system::{EventSubscriber, RemoveEventArgs};
use store_object::MetadataStorage;

use crate::metadata::{SoftDeletableMetadata, SOFT_DELETABLE, SOFT_DELETABLE_HANDLER};

#[derive(Debug, Clone)]
pub struct SoftDeletableHandler {
    metadata: Arc<MetadataStorage>,
}

impl SoftDeletableHandler {
    pub fn new(metadata: Arc<MetadataStorage>) -> Self {
        Self { metadata }
    }
}

impl EventSubscriber for SoftDeletableHandler {
    fn name(&self) -> &str {
        SOFT_DELETABLE_HANDLER
    }

    fn before_remove(&self, args: &mut RemoveEventArgs<'_>) -> anyhow::Result<()> {
        let Some(config) = self
            .metadata
            .get::<SoftDeletableMetadata>(args.entity_type(), SOFT_DELETABLE)
        else {
            crate::trace_log!(entity = args.entity_name(), "not soft-deletable, deleting");
            return Ok(());
        };

        let value = config.value().with_context(|| {
            format!(
                "computing soft delete value of {}.{}",
                args.entity_name(),
                config.field()
            )
        })?;

        crate::debug_log!(
            entity = args.entity_name(),
            id = args.entity_id(),
            field = config.field(),
            "soft deleting"
        );
        args.cancel_and_update(config.field(), value);
        Ok(())
    }
}
