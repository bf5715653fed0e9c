//! Per-connection event subscriptions.
//!
//! Each subscribed event gets a forwarder task that writes event pushes
//! into the connection's output channel until it is cancelled or the
//! event goes away.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wifiap_core::{EventError, EventRegistry, Subscription};

use super::wire::EventPush;

#[derive(Debug)]
struct Forwarder {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Subscriptions held by one client of the verb protocol.
#[derive(Debug)]
pub struct Session {
    registry: EventRegistry,
    out: mpsc::Sender<String>,
    forwarders: HashMap<String, Forwarder>,
}

impl Session {
    pub fn new(registry: EventRegistry, out: mpsc::Sender<String>) -> Self {
        Self {
            registry,
            out,
            forwarders: HashMap::new(),
        }
    }

    /// Start forwarding `name`. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, name: &str) -> Result<(), EventError> {
        if self
            .forwarders
            .get(name)
            .is_some_and(|f| !f.handle.is_finished())
        {
            return Ok(());
        }
        let subscription = self.registry.subscribe(name)?;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(forward(
            subscription,
            self.registry.clone(),
            self.out.clone(),
            cancel.clone(),
        ));
        self.forwarders
            .insert(name.to_owned(), Forwarder { cancel, handle });
        debug!(event = name, "subscribed");
        Ok(())
    }

    /// Stop forwarding `name`. Unsubscribing a registered event this
    /// session never subscribed to succeeds.
    pub async fn unsubscribe(&mut self, name: &str) -> Result<(), EventError> {
        if !self.registry.is_registered(name) {
            return Err(EventError::UnknownEvent {
                name: name.to_owned(),
            });
        }
        if let Some(forwarder) = self.forwarders.remove(name) {
            forwarder.cancel.cancel();
            if let Err(e) = forwarder.handle.await {
                warn!(error = %e, event = name, "event forwarder ended abnormally");
            }
            debug!(event = name, "unsubscribed");
        }
        Ok(())
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.forwarders.contains_key(name)
    }

    /// Cancel every forwarder and wait for them to exit.
    pub async fn close(mut self) {
        for (name, forwarder) in self.forwarders.drain() {
            forwarder.cancel.cancel();
            if let Err(e) = forwarder.handle.await {
                warn!(error = %e, event = %name, "event forwarder ended abnormally");
            }
        }
    }
}

async fn forward(
    mut subscription: Subscription,
    registry: EventRegistry,
    out: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let push = EventPush {
                    event: subscription.name(),
                    data: &event,
                };
                match push.to_line() {
                    Ok(line) => {
                        if out.send(line).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to encode event (non-fatal)"),
                }
            }
        }
    }
    if let Err(e) = registry.unsubscribe(subscription) {
        debug!(error = %e, "event vanished before unsubscribe");
    }
}
