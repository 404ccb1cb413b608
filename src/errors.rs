//! Error types for the soft-deletable crate
//!
//! This module contains all error types that can be returned while
//! decorating entities or registering the deletion handler.

use signal_system::EventError;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoftDeletableError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Handler registration failed: {0}")]
    Registration(#[from] EventError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}
