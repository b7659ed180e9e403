//! Connection Broker - authorization initiation and result reconciliation
//!
//! Owns the client side of the integration handshake: it opens consent
//! surfaces, tracks at most one pending attempt per provider, reconciles
//! relayed results, and keeps the status cache authoritative.
//!
//! # Trust model
//!
//! A relayed result only ever *triggers* work; it is never a source of
//! truth. Visible connection state changes exclusively through a status
//! refetch, so a forged success message cannot fabricate a connected
//! state - at worst it causes a harmless extra refresh. Messages whose
//! origin is not the application's own are discarded outright.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tallysync_core::{
    BrokerEvent, Envelope, EventSender, Notification, Provider, RelayedResult,
};

use crate::api::{IntegrationsBackend, TestOutcome, ToggleOutcome};
use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::pending::PendingSet;
use crate::status::{StatusSnapshot, StatusStore};
use crate::surface::SurfaceOpener;

/// Notification text when a confirmed handshake cannot be verified against
/// the server
const UNCONFIRMED_MESSAGE: &str =
    "Connected, but the connection status could not be confirmed. Please refresh.";

/// The integration connection broker
pub struct ConnectionBroker {
    config: BrokerConfig,
    backend: Arc<dyn IntegrationsBackend>,
    status: Arc<StatusStore>,
    pending: PendingSet,
    opener: Arc<dyn SurfaceOpener>,
    events: EventSender,
}

impl ConnectionBroker {
    pub fn new(
        config: BrokerConfig,
        backend: Arc<dyn IntegrationsBackend>,
        opener: Arc<dyn SurfaceOpener>,
        events: EventSender,
    ) -> Self {
        let status = Arc::new(StatusStore::new(backend.clone()));
        Self {
            config,
            backend,
            status,
            pending: PendingSet::new(),
            opener,
            events,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn status_store(&self) -> Arc<StatusStore> {
        self.status.clone()
    }

    /// Current cached status without touching the backend
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.status.snapshot().await
    }

    pub fn is_pending(&self, provider: Provider) -> bool {
        self.pending.is_pending(provider)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ------------------------------------------------------------------
    // Authorization initiation
    // ------------------------------------------------------------------

    /// Begin an authorization flow for a provider
    ///
    /// Requests an authorization URL from the backend and opens a secondary
    /// consent surface at it. An existing pending attempt for the provider
    /// is replaced; the superseded surface is orphaned, not closed. The
    /// primary context is never blocked.
    pub async fn begin_connection(&self, provider: Provider) -> Result<(), BrokerError> {
        let lock = self.pending.lock_for(provider);
        let _guard = lock.lock().await;

        info!(%provider, "[Broker] Beginning connection");

        let auth_url = match self.backend.auth_url(provider).await {
            Ok(url) => url,
            Err(e) => {
                let detail = e.to_string();
                warn!(%provider, error = %detail, "[Broker] Could not obtain authorization URL");
                self.notify(Notification::error(detail.clone()));
                return Err(BrokerError::AuthUrlUnavailable { detail });
            }
        };

        let handle = match self.opener.open(&auth_url) {
            Ok(handle) => handle,
            Err(e) => {
                let detail = e.to_string();
                warn!(%provider, error = %detail, "[Broker] Could not open consent surface");
                self.notify(Notification::error(detail.clone()));
                return Err(BrokerError::SurfaceUnavailable { detail });
            }
        };

        self.pending.begin(provider, handle);
        self.events
            .emit(BrokerEvent::AuthorizationStarted { provider });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Result reconciliation
    // ------------------------------------------------------------------

    /// Reconcile a message relayed from another browsing context
    ///
    /// Envelopes from any origin other than the application's own are
    /// discarded unconditionally - they are expected background noise, not
    /// trusted input, so they are not surfaced or recorded.
    pub async fn handle_envelope(&self, envelope: Envelope) {
        if envelope.origin != self.config.app_origin {
            return;
        }
        let Some(result) = envelope.message.decode() else {
            debug!("[Broker] Ignoring malformed relay message");
            return;
        };
        self.apply_result(result).await;
    }

    /// Apply a terminal handshake result
    ///
    /// Single canonical path shared by the relay route and the same-tab
    /// route, so both produce identical notifications.
    pub async fn apply_result(&self, result: RelayedResult) {
        match result {
            RelayedResult::Success { provider } => {
                {
                    let lock = self.pending.lock_for(provider);
                    let _guard = lock.lock().await;
                    self.pending.clear(provider);
                    self.events
                        .emit(BrokerEvent::ConnectionEstablished { provider });
                    self.notify(Notification::success(format!(
                        "{} connected successfully!",
                        provider.display_name()
                    )));
                }

                // The message is only a trigger: the visible status comes
                // from this refetch, never from the message itself.
                if let Err(e) = self.refresh_status().await {
                    warn!(%provider, error = %e, "[Broker] Could not confirm connection after handshake");
                    self.notify(Notification::error(UNCONFIRMED_MESSAGE));
                }
            }
            RelayedResult::Error { provider, code } => {
                match provider {
                    Some(provider) => {
                        let lock = self.pending.lock_for(provider);
                        let _guard = lock.lock().await;
                        self.pending.clear(provider);
                    }
                    // The error marker names no provider; no flow may
                    // outlive its own failure report.
                    None => self.pending.clear_all(),
                }
                info!(code = code.as_str(), "[Broker] Handshake failed");
                self.events
                    .emit(BrokerEvent::connection_failed(provider, &code));
                self.notify(Notification::error(code.message()));
                // No refetch: no state change is expected, and skipping it
                // avoids a spurious flicker.
            }
        }
    }

    /// Refetch status and announce the new snapshot
    pub async fn refresh_status(&self) -> Result<StatusSnapshot, BrokerError> {
        let snapshot = self.status.refresh().await?;
        self.events.emit(BrokerEvent::StatusRefreshed);
        Ok(snapshot)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Remove the provider's configuration on the server
    ///
    /// User confirmation happens upstream. On success the status cache is
    /// refreshed immediately; on failure the server's error detail is
    /// surfaced verbatim and prior state is untouched.
    pub async fn disconnect(&self, provider: Provider) -> Result<(), BrokerError> {
        match self.backend.disconnect(provider).await {
            Ok(server_message) => {
                debug!(%provider, message = %server_message, "[Broker] Disconnected");
                self.events.emit(BrokerEvent::Disconnected { provider });
                self.notify(Notification::success(format!(
                    "{} disconnected successfully.",
                    provider.display_name()
                )));
                if let Err(e) = self.refresh_status().await {
                    warn!(%provider, error = %e, "[Broker] Refresh after disconnect failed");
                }
                Ok(())
            }
            Err(e) => {
                let detail = e.to_string();
                warn!(%provider, error = %detail, "[Broker] Disconnect failed");
                self.notify(Notification::error(detail.clone()));
                Err(BrokerError::OperationFailed { detail })
            }
        }
    }

    /// Probe connectivity without changing any stored state
    ///
    /// The outcome is returned for inline display; the status cache is
    /// never touched.
    pub async fn test(&self, provider: Provider) -> Result<TestOutcome, BrokerError> {
        self.backend
            .test(provider)
            .await
            .map_err(|e| BrokerError::OperationFailed {
                detail: e.to_string(),
            })
    }

    /// Trigger an out-of-band sync job
    ///
    /// Fires the request and refreshes status best-effort afterwards. Job
    /// completion is not tracked here.
    pub async fn sync(&self, provider: Provider) -> Result<(), BrokerError> {
        match self.backend.sync(provider).await {
            Ok(()) => {
                self.events.emit(BrokerEvent::SyncRequested { provider });
                if let Err(e) = self.refresh_status().await {
                    debug!(%provider, error = %e, "[Broker] Best-effort refresh after sync failed");
                }
                Ok(())
            }
            Err(e) => {
                let detail = e.to_string();
                warn!(%provider, error = %detail, "[Broker] Sync request failed");
                self.notify(Notification::error(detail.clone()));
                Err(BrokerError::OperationFailed { detail })
            }
        }
    }

    /// Toggle monitoring on/off for a configured provider
    pub async fn toggle(&self, provider: Provider) -> Result<ToggleOutcome, BrokerError> {
        match self.backend.toggle(provider).await {
            Ok(outcome) => {
                self.notify(Notification::success(outcome.message.clone()));
                if let Err(e) = self.refresh_status().await {
                    warn!(%provider, error = %e, "[Broker] Refresh after toggle failed");
                }
                Ok(outcome)
            }
            Err(e) => {
                let detail = e.to_string();
                self.notify(Notification::error(detail.clone()));
                Err(BrokerError::OperationFailed { detail })
            }
        }
    }

    // ------------------------------------------------------------------
    // Listener lifecycle
    // ------------------------------------------------------------------

    /// Start consuming relayed envelopes from an inbox
    ///
    /// Spawns a consumer task; dropping the returned guard stops it, so
    /// the listener is released on every exit path of the owning view.
    pub fn attach_inbox(
        self: &Arc<Self>,
        mut inbox: mpsc::UnboundedReceiver<Envelope>,
    ) -> InboxGuard {
        let broker = Arc::clone(self);
        let handle = tokio::spawn(async move {
            info!("[Broker] Listening for relayed results");
            while let Some(envelope) = inbox.recv().await {
                broker.handle_envelope(envelope).await;
            }
            info!("[Broker] Relay inbox closed");
        });
        InboxGuard { handle }
    }

    fn notify(&self, notification: Notification) {
        self.events.emit(BrokerEvent::Notified(notification));
    }
}

/// Scoped subscription to a relay inbox
///
/// Dropping the guard aborts the consumer task.
pub struct InboxGuard {
    handle: JoinHandle<()>,
}

impl InboxGuard {
    /// Explicitly stop consuming
    pub fn release(self) {}

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for InboxGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
