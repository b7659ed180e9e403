//! Status Store - server-authoritative connection cache
//!
//! Holds the last-known, server-confirmed connection state per provider.
//! The cache is only ever mutated through [`StatusStore::refresh`]; relayed
//! handshake results never touch it. Concurrent refreshes are safe: each
//! request carries a sequence number and a response is applied only if
//! nothing issued later has been applied already, so a stale in-flight
//! response can never overwrite a fresher one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use tallysync_core::{Provider, ProviderConnection, StatusPayload};

use crate::api::IntegrationsBackend;
use crate::error::BrokerError;

/// Point-in-time view of the cached connection state
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub connections: HashMap<Provider, ProviderConnection>,
    /// True when the last refresh attempt failed and the cache may be
    /// behind the server
    pub stale: bool,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// Connection entry for a provider, defaulting to not-configured
    pub fn connection(&self, provider: Provider) -> ProviderConnection {
        self.connections
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderConnection::not_configured(provider))
    }
}

struct CacheState {
    snapshot: StatusSnapshot,
    /// Sequence number of the refresh whose response is currently applied
    applied_seq: u64,
}

/// Server-authoritative status cache
pub struct StatusStore {
    backend: Arc<dyn IntegrationsBackend>,
    state: RwLock<CacheState>,
    issue_seq: AtomicU64,
}

impl StatusStore {
    pub fn new(backend: Arc<dyn IntegrationsBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(CacheState {
                snapshot: StatusSnapshot::default(),
                applied_seq: 0,
            }),
            issue_seq: AtomicU64::new(0),
        }
    }

    /// Current cached view without touching the backend
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.state.read().await.snapshot.clone()
    }

    /// Refetch status from the backend and replace the cache
    ///
    /// Idempotent and safe to call concurrently with itself. On failure the
    /// previous snapshot stays visible, marked stale.
    pub async fn refresh(&self) -> Result<StatusSnapshot, BrokerError> {
        let seq = self.issue_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "[Status] Refresh issued");

        match self.backend.status().await {
            Ok(payload) => {
                let snapshot = Self::build_snapshot(payload);
                let mut state = self.state.write().await;
                if seq > state.applied_seq {
                    state.snapshot = snapshot;
                    state.applied_seq = seq;
                    debug!(seq, "[Status] Refresh applied");
                } else {
                    debug!(
                        seq,
                        applied = state.applied_seq,
                        "[Status] Dropping stale refresh response"
                    );
                }
                Ok(state.snapshot.clone())
            }
            Err(e) => {
                warn!(seq, error = %e, "[Status] Refresh failed, keeping previous state");
                let mut state = self.state.write().await;
                // Only mark stale if nothing fresher landed meanwhile
                if seq > state.applied_seq {
                    state.snapshot.stale = true;
                }
                Err(BrokerError::StatusUnavailable {
                    detail: e.to_string(),
                })
            }
        }
    }

    fn build_snapshot(payload: StatusPayload) -> StatusSnapshot {
        let mut connections = HashMap::new();
        for provider in Provider::ALL {
            let connection = payload
                .get(&provider)
                .map(|entry| ProviderConnection::from_entry(provider, entry))
                .unwrap_or_else(|| ProviderConnection::not_configured(provider));
            connections.insert(provider, connection);
        }
        StatusSnapshot {
            connections,
            stale: false,
            last_refreshed_at: Some(Utc::now()),
        }
    }
}
