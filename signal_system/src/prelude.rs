//! Convenience re-exports for common signal-system usage

// Core signal system components
pub use crate::event::{DatabaseEvent, EventType};
pub use crate::manager::EventManager;
pub use crate::subscriber::{EventSubscriber, RemovalAction, RemoveEventArgs};
pub use crate::types::{EventCallback, EventError, Record};

// Common external dependencies
pub use serde::{Deserialize, Serialize};
pub use serde_json;
