// ── Named event registry ──
//
// Maps event names to broadcast channels. Subscribers hold a
// `Subscription`; dropping it (or handing it back through
// `unsubscribe`) stops delivery.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::EventError;
use crate::model::ApEvent;

const EVENT_CHANNEL_SIZE: usize = 64;

/// Process-wide registry of publishable events. Cheaply cloneable.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Arc<DashMap<String, broadcast::Sender<Arc<ApEvent>>>>,
}

/// A live subscription to one named event.
#[derive(Debug)]
pub struct Subscription {
    name: String,
    rx: broadcast::Receiver<Arc<ApEvent>>,
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the next event. `None` once the event is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<Arc<ApEvent>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(event = %self.name, skipped, "subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new named event. Fails if the name is taken.
    pub fn register(&self, name: &str) -> Result<(), EventError> {
        match self.events.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(EventError::AlreadyRegistered {
                name: name.to_owned(),
            }),
            Entry::Vacant(slot) => {
                let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
                slot.insert(tx);
                debug!(event = name, "event registered");
                Ok(())
            }
        }
    }

    pub fn subscribe(&self, name: &str) -> Result<Subscription, EventError> {
        let tx = self.events.get(name).ok_or_else(|| unknown(name))?;
        Ok(Subscription {
            name: name.to_owned(),
            rx: tx.subscribe(),
        })
    }

    /// End a subscription obtained from [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, subscription: Subscription) -> Result<(), EventError> {
        if !self.events.contains_key(&subscription.name) {
            return Err(unknown(&subscription.name));
        }
        drop(subscription);
        Ok(())
    }

    /// Push `event` to every subscriber of `name`. Returns how many got it.
    pub fn publish(&self, name: &str, event: ApEvent) -> Result<usize, EventError> {
        let tx = self.events.get(name).ok_or_else(|| unknown(name))?;
        Ok(tx.send(Arc::new(event)).unwrap_or(0))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn subscriber_count(&self, name: &str) -> Result<usize, EventError> {
        let tx = self.events.get(name).ok_or_else(|| unknown(name))?;
        Ok(tx.receiver_count())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

fn unknown(name: &str) -> EventError {
    EventError::UnknownEvent {
        name: name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientStateEvent, StationChange};

    fn connected(n: u32) -> ApEvent {
        ApEvent::ClientState(ClientStateEvent {
            event: StationChange::Connected,
            number_client: n,
        })
    }

    #[test]
    fn register_rejects_duplicates() {
        let registry = EventRegistry::new();
        assert!(registry.register("client-state").is_ok());
        assert_eq!(
            registry.register("client-state"),
            Err(EventError::AlreadyRegistered {
                name: "client-state".into()
            })
        );
        assert_eq!(registry.names(), vec!["client-state".to_owned()]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = EventRegistry::new();
        assert!(matches!(
            registry.subscribe("nope"),
            Err(EventError::UnknownEvent { .. })
        ));
        assert!(matches!(
            registry.publish("nope", connected(1)),
            Err(EventError::UnknownEvent { .. })
        ));
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let registry = EventRegistry::new();
        assert!(registry.register("client-state").is_ok());
        assert_eq!(registry.publish("client-state", connected(1)).ok(), Some(0));

        let Ok(mut sub) = registry.subscribe("client-state") else {
            panic!("subscribe failed");
        };
        assert_eq!(registry.subscriber_count("client-state").ok(), Some(1));
        assert_eq!(registry.publish("client-state", connected(2)).ok(), Some(1));
        assert_eq!(sub.recv().await.as_deref(), Some(&connected(2)));

        assert!(registry.unsubscribe(sub).is_ok());
        assert_eq!(registry.subscriber_count("client-state").ok(), Some(0));
    }
}
