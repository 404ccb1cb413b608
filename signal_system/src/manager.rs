use std::sync::{Arc, RwLock};

use config::EventConfig;

use crate::event::DatabaseEvent;
use crate::subscriber::{EventSubscriber, RemoveEventArgs};
use crate::types::{EventCallback, EventError};

/// Lifecycle event manager shared by every entity manager of an ORM instance
pub struct EventManager {
    config: EventConfig,
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
    callbacks: RwLock<Vec<EventCallback>>,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("subscriber_count", &self.subscriber_count())
            .field("callback_count", &self.callback_count())
            .field("config", &self.config)
            .finish()
    }
}

impl EventManager {
    pub fn new(config: EventConfig) -> Self {
        Self {
            config,
            subscribers: RwLock::new(Vec::new()),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// Register a lifecycle subscriber.
    ///
    /// Returns `Ok(false)` when a subscriber with the same name is already
    /// registered and `deduplicate_subscribers` is enabled.
    pub fn register_subscriber(
        &self,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Result<bool, EventError> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| EventError::LockPoisoned)?;

        if self.config.deduplicate_subscribers
            && subscribers.iter().any(|s| s.name() == subscriber.name())
        {
            tracing::debug!(
                subscriber = subscriber.name(),
                "subscriber already registered, skipping"
            );
            return Ok(false);
        }

        if subscribers.len() >= self.config.max_subscribers {
            return Err(EventError::SubscriberLimit {
                subscriber: subscriber.name().to_string(),
                limit: self.config.max_subscribers,
            });
        }

        tracing::debug!(subscriber = subscriber.name(), "registering subscriber");
        subscribers.push(subscriber);
        Ok(true)
    }

    /// Whether a subscriber with this name is registered
    pub fn has_subscriber(&self, name: &str) -> bool {
        self.subscribers
            .read()
            .map(|s| s.iter().any(|sub| sub.name() == name))
            .unwrap_or(false)
    }

    /// Get number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Run `before_remove` on every interested subscriber, in registration order
    pub fn dispatch_before_remove(&self, args: &mut RemoveEventArgs<'_>) -> Result<(), EventError> {
        let subscribers: Vec<Arc<dyn EventSubscriber>> = self
            .subscribers
            .read()
            .map_err(|_| EventError::LockPoisoned)?
            .clone();

        for subscriber in subscribers {
            if let Some(entities) = subscriber.subscribed_entities() {
                if !entities.iter().any(|e| *e == args.entity_name()) {
                    continue;
                }
            }

            tracing::trace!(
                subscriber = subscriber.name(),
                entity = args.entity_name(),
                id = args.entity_id(),
                "before_remove"
            );
            subscriber
                .before_remove(args)
                .map_err(|source| EventError::Subscriber {
                    subscriber: subscriber.name().to_string(),
                    hook: "before_remove",
                    source,
                })?;
        }

        Ok(())
    }

    /// Add post-commit event callback
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&DatabaseEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Emit event to all callbacks
    pub fn emit(&self, event: DatabaseEvent) {
        let callbacks: Vec<EventCallback> = match self.callbacks.read() {
            Ok(callbacks) => callbacks.clone(),
            Err(_) => return,
        };
        for callback in callbacks.iter() {
            callback(&event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(EventConfig::default())
    }
}
