use signal_system::EventError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {entity} with id {id} already exists")]
    Conflict { entity: String, id: String },

    #[error("Validation error in {entity}.{field}: {message}")]
    ValidationError {
        entity: String,
        field: String,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Lifecycle event error: {0}")]
    Event(#[from] EventError),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl StoreError {
    pub fn validation(entity: &str, field: &str, message: &str) -> Self {
        Self::ValidationError {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn serialization(entity: &str, err: serde_json::Error) -> Self {
        Self::SerializationError(format!("{}: {}", entity, err))
    }
}
