//! Browsing-context seams
//!
//! The broker coordinates two browsing contexts that share no memory: the
//! primary application context and a short-lived secondary surface hosting
//! the provider's consent UI. These traits model the capabilities each
//! side actually has:
//!
//! - [`SurfaceOpener`]: the primary context can spawn a secondary surface.
//! - [`InteractionSurface`]: a handle that only knows whether the surface
//!   is open and can close it. Its contents are cross-origin and never
//!   readable.
//! - [`RelayTarget`]: the secondary context may hold a handle to the
//!   context that spawned it, usable only to post an origin-tagged message.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use tallysync_core::Envelope;

/// Handle to an open secondary interaction surface
///
/// Used only to know the surface exists and to close it. Reading its
/// contents would violate cross-origin isolation.
pub trait InteractionSurface: Send + Sync {
    fn is_open(&self) -> bool;
    fn close(&self);
}

/// Capability to spawn a secondary surface at an authorization URL
pub trait SurfaceOpener: Send + Sync {
    fn open(&self, url: &str) -> anyhow::Result<Arc<dyn InteractionSurface>>;
}

/// Capability to post a message to another browsing context
///
/// The transport stamps the sender's origin on the envelope; the receiver
/// decides what to trust.
pub trait RelayTarget: Send + Sync {
    fn post(&self, envelope: Envelope);
}

/// Channel-backed relay target delivering into the primary context's inbox
pub struct ChannelRelayTarget {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ChannelRelayTarget {
    pub fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Create a target together with the receiving inbox
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(tx)), rx)
    }
}

impl RelayTarget for ChannelRelayTarget {
    fn post(&self, envelope: Envelope) {
        // The receiving context may already be gone; posting is fire-and-forget
        if self.tx.send(envelope).is_err() {
            debug!("[Relay] Dropped message: receiving context closed");
        }
    }
}
