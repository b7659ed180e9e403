//! Pending authorization tracking
//!
//! At most one pending attempt exists per provider. A fresh attempt for a
//! provider with an existing entry replaces it; the superseded surface is
//! orphaned and harmless. Abandoned entries carry no timers and consume
//! nothing beyond a closed handle, so they are left alone until superseded
//! or reconciled.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use tallysync_core::Provider;

use crate::surface::InteractionSurface;

/// An authorization attempt awaiting a terminal result
pub struct PendingAuthorization {
    pub provider: Provider,
    pub started_at: Instant,
    /// Handle to the secondary surface, used only to know it is open
    pub handle: Arc<dyn InteractionSurface>,
}

/// Process-local set of pending authorizations, keyed by provider
#[derive(Default)]
pub struct PendingSet {
    entries: DashMap<Provider, PendingAuthorization>,
    /// Per-provider guards serializing begin-connection against result
    /// reconciliation for the same provider
    locks: DashMap<Provider, Arc<Mutex<()>>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard for the provider's begin/reconcile critical section
    pub fn lock_for(&self, provider: Provider) -> Arc<Mutex<()>> {
        self.locks
            .entry(provider)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a new pending attempt, replacing any existing one
    pub fn begin(&self, provider: Provider, handle: Arc<dyn InteractionSurface>) {
        let superseded = self
            .entries
            .insert(
                provider,
                PendingAuthorization {
                    provider,
                    started_at: Instant::now(),
                    handle,
                },
            )
            .is_some();
        if superseded {
            debug!(%provider, "[Pending] Superseded earlier attempt");
        }
    }

    /// Clear the pending entry for a provider, if any
    pub fn clear(&self, provider: Provider) -> bool {
        self.entries.remove(&provider).is_some()
    }

    /// Clear every pending entry
    ///
    /// Used when a terminal error names no provider: a dangling flow must
    /// not survive its own failure report.
    pub fn clear_all(&self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, provider: Provider) -> bool {
        self.entries.contains_key(&provider)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
