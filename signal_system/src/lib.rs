//! Signal system for entity lifecycle events
//!
//! This crate provides the lifecycle subscriber hooks run during a flush
//! and the post-commit event signals of the persistence layer.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod subscriber;
pub mod types;

pub use event::{DatabaseEvent, EventType};
pub use manager::EventManager;
pub use subscriber::{EventSubscriber, RemovalAction, RemoveEventArgs};
pub use types::{EventCallback, EventError, Record};
