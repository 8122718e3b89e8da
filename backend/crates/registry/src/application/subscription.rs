//! Registry Event Subscriptions
//!
//! Fan-out of registry events to any number of listeners. Subscriptions are
//! explicit handles: dropping one or calling `unsubscribe` detaches it.

use tokio::sync::broadcast;

use crate::domain::events::RegistryEvent;

/// What a subscription yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Event(RegistryEvent),
    /// The subscriber fell behind and `n` events were discarded
    Missed(u64),
}

/// Publish side of the event channel
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver `event` to every live subscription; returns how many received it
    pub fn publish(&self, event: RegistryEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(event = event.as_str(), "Registry event had no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Receive side handle
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<RegistryEvent>,
}

impl Subscription {
    /// Next delivery, or `None` once every `EventHub` handle is gone
    pub async fn next(&mut self) -> Option<Delivery> {
        match self.receiver.recv().await {
            Ok(event) => Some(Delivery::Event(event)),
            Err(broadcast::error::RecvError::Lagged(n)) => Some(Delivery::Missed(n)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}
