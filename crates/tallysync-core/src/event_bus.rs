//! Event Bus - broker event distribution
//!
//! Broker events flow through a broadcast channel so several consumers
//! (UI bridge, audit logging, tests) can observe the same stream without
//! coupling to the broker.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::BrokerEvent;

/// Default channel capacity for the event bus
const DEFAULT_CAPACITY: usize = 128;

/// Central hub for broker event distribution
///
/// Each subscriber gets its own copy of every event emitted after it
/// subscribed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BrokerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Get a sender for emitting events
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Subscribe to receive events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Used by the broker to emit events
///
/// Thread-safe and cheaply cloneable.
#[derive(Clone)]
pub struct EventSender {
    sender: broadcast::Sender<BrokerEvent>,
}

impl EventSender {
    /// Emit an event, returning the number of receivers it reached
    ///
    /// Zero receivers is not an error; it just means no one is listening.
    pub fn emit(&self, event: BrokerEvent) -> usize {
        let type_name = event.type_name();
        match self.sender.send(event) {
            Ok(count) => {
                debug!(event_type = type_name, receivers = count, "[EventBus] Emitted event");
                count
            }
            Err(_) => {
                debug!(event_type = type_name, "[EventBus] No receivers for event");
                0
            }
        }
    }

    /// Emit an event and warn if no one received it
    pub fn emit_or_warn(&self, event: BrokerEvent) {
        let type_name = event.type_name();
        if self.emit(event) == 0 {
            warn!(event_type = type_name, "[EventBus] Event emitted but no receivers listening");
        }
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Used by consumers to receive broker events
pub struct EventReceiver {
    receiver: broadcast::Receiver<BrokerEvent>,
}

impl EventReceiver {
    /// Receive the next event
    ///
    /// Returns `None` when the channel closes. Lag is tolerated: skipped
    /// events are logged and reception continues with the next available.
    pub async fn recv(&mut self) -> Option<BrokerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped_events = skipped, "[EventBus] Receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("[EventBus] Channel closed");
                    return None;
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Option<BrokerEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped_events = skipped, "[EventBus] Receiver lagged on try_recv");
                self.receiver.try_recv().ok()
            }
            Err(_) => None,
        }
    }
}

/// Shared event bus for application-wide use
pub type SharedEventBus = Arc<EventBus>;

pub fn create_shared_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}
