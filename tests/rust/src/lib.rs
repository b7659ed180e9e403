//! Shared test utilities and fixtures for TallySync integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;

use tallysync_broker::{
    BrokerConfig, ConnectionBroker, IntegrationsBackend, InteractionSurface, SurfaceOpener,
    TestOutcome, ToggleOutcome,
};
use tallysync_core::{EventBus, Provider, ProviderStatusEntry, StatusPayload};

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Origin the test broker treats as its own
pub const APP_ORIGIN: &str = "http://localhost:3000";
/// An origin the broker must never trust
pub const FOREIGN_ORIGIN: &str = "http://evil.example";

// ============================================================================
// Status payload builders
// ============================================================================

pub fn entry(connected: bool, configured: bool) -> ProviderStatusEntry {
    ProviderStatusEntry {
        connected,
        configured,
        ..Default::default()
    }
}

/// Payload where one provider is active and everything else unset
pub fn active_payload(provider: Provider) -> StatusPayload {
    let mut payload = StatusPayload::new();
    payload.insert(provider, entry(true, true));
    payload
}

/// Payload where one provider is configured but inactive
pub fn inactive_payload(provider: Provider) -> StatusPayload {
    let mut payload = StatusPayload::new();
    payload.insert(provider, entry(false, true));
    payload
}

// ============================================================================
// Scripted backend
// ============================================================================

/// One scripted response for the status endpoint
pub struct ScriptedStatus {
    pub delay: Option<Duration>,
    pub result: Result<StatusPayload, String>,
}

impl ScriptedStatus {
    pub fn ok(payload: StatusPayload) -> Self {
        Self {
            delay: None,
            result: Ok(payload),
        }
    }

    pub fn ok_after(delay: Duration, payload: StatusPayload) -> Self {
        Self {
            delay: Some(delay),
            result: Ok(payload),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: None,
            result: Err(message.to_string()),
        }
    }
}

/// Backend double with per-endpoint scripting and call counters
///
/// Status responses come from a script queue; once exhausted, the default
/// payload is served. Other endpoints return their configured response or a
/// benign default.
pub struct FakeBackend {
    pub status_script: Mutex<VecDeque<ScriptedStatus>>,
    pub default_status: Mutex<StatusPayload>,
    pub status_calls: AtomicUsize,

    pub auth_url_result: Mutex<Result<String, String>>,
    pub auth_url_calls: AtomicUsize,

    pub disconnect_result: Mutex<Result<String, String>>,
    pub test_result: Mutex<Result<TestOutcome, String>>,
    pub sync_result: Mutex<Result<(), String>>,
    pub toggle_result: Mutex<Result<ToggleOutcome, String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            status_script: Mutex::new(VecDeque::new()),
            default_status: Mutex::new(StatusPayload::new()),
            status_calls: AtomicUsize::new(0),
            auth_url_result: Mutex::new(Ok("http://consent.test/authorize".to_string())),
            auth_url_calls: AtomicUsize::new(0),
            disconnect_result: Mutex::new(Ok("disconnected".to_string())),
            test_result: Mutex::new(Ok(TestOutcome {
                success: true,
                message: "configuration is valid".to_string(),
            })),
            sync_result: Mutex::new(Ok(())),
            toggle_result: Mutex::new(Ok(ToggleOutcome {
                is_active: true,
                message: "Monitoring enabled".to_string(),
            })),
        }
    }
}

impl FakeBackend {
    pub fn script_status(&self, response: ScriptedStatus) {
        self.status_script.lock().push_back(response);
    }

    pub fn set_default_status(&self, payload: StatusPayload) {
        *self.default_status.lock() = payload;
    }

    pub fn fail_auth_url(&self, detail: &str) {
        *self.auth_url_result.lock() = Err(detail.to_string());
    }

    pub fn fail_disconnect(&self, detail: &str) {
        *self.disconnect_result.lock() = Err(detail.to_string());
    }

    pub fn fail_sync(&self, detail: &str) {
        *self.sync_result.lock() = Err(detail.to_string());
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntegrationsBackend for FakeBackend {
    async fn status(&self) -> anyhow::Result<StatusPayload> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.status_script.lock().pop_front();
        match scripted {
            Some(response) => {
                if let Some(delay) = response.delay {
                    tokio::time::sleep(delay).await;
                }
                response.result.map_err(|m| anyhow!(m))
            }
            None => Ok(self.default_status.lock().clone()),
        }
    }

    async fn auth_url(&self, _provider: Provider) -> anyhow::Result<String> {
        self.auth_url_calls.fetch_add(1, Ordering::SeqCst);
        self.auth_url_result.lock().clone().map_err(|m| anyhow!(m))
    }

    async fn disconnect(&self, _provider: Provider) -> anyhow::Result<String> {
        self.disconnect_result.lock().clone().map_err(|m| anyhow!(m))
    }

    async fn test(&self, _provider: Provider) -> anyhow::Result<TestOutcome> {
        self.test_result
            .lock()
            .as_ref()
            .map(|o| TestOutcome {
                success: o.success,
                message: o.message.clone(),
            })
            .map_err(|m| anyhow!(m.clone()))
    }

    async fn sync(&self, _provider: Provider) -> anyhow::Result<()> {
        self.sync_result.lock().clone().map_err(|m| anyhow!(m))
    }

    async fn toggle(&self, _provider: Provider) -> anyhow::Result<ToggleOutcome> {
        self.toggle_result
            .lock()
            .as_ref()
            .map(|o| ToggleOutcome {
                is_active: o.is_active,
                message: o.message.clone(),
            })
            .map_err(|m| anyhow!(m.clone()))
    }
}

// ============================================================================
// Surface doubles
// ============================================================================

/// Secondary-surface handle that only tracks open/closed
pub struct FakeSurface {
    open: AtomicBool,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            open: AtomicBool::new(true),
        })
    }
}

impl InteractionSurface for FakeSurface {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Opener that records every URL it was asked to open
#[derive(Default)]
pub struct FakeOpener {
    pub opened: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub handles: Mutex<Vec<Arc<FakeSurface>>>,
}

impl FakeOpener {
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl SurfaceOpener for FakeOpener {
    fn open(&self, url: &str) -> anyhow::Result<Arc<dyn InteractionSurface>> {
        if self.fail.swap(false, Ordering::SeqCst) {
            anyhow::bail!("could not open authorization window");
        }
        self.opened.lock().push(url.to_string());
        let surface = FakeSurface::new();
        self.handles.lock().push(surface.clone());
        Ok(surface)
    }
}

// ============================================================================
// Broker harness
// ============================================================================

pub struct BrokerHarness {
    pub broker: Arc<ConnectionBroker>,
    pub backend: Arc<FakeBackend>,
    pub opener: Arc<FakeOpener>,
    pub bus: EventBus,
}

/// Broker wired to fakes with the test app origin
pub fn harness() -> BrokerHarness {
    let backend = Arc::new(FakeBackend::default());
    let opener = Arc::new(FakeOpener::default());
    let bus = EventBus::new();
    let config = BrokerConfig::new("http://api.test", APP_ORIGIN);
    let broker = Arc::new(ConnectionBroker::new(
        config,
        backend.clone(),
        opener.clone(),
        bus.sender(),
    ));
    BrokerHarness {
        broker,
        backend,
        opener,
        bus,
    }
}

/// Event testing utilities
pub mod events {
    use std::time::Duration;

    use tallysync_core::{BrokerEvent, EventReceiver, Notification};

    /// Collect events from a receiver until it stays quiet
    pub async fn collect_events(rx: &mut EventReceiver, timeout: Duration) -> Vec<BrokerEvent> {
        let mut events = Vec::new();
        loop {
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(event)) => events.push(event),
                _ => break,
            }
        }
        events
    }

    /// Notifications among the collected events, in emission order
    pub fn notifications(events: &[BrokerEvent]) -> Vec<Notification> {
        events
            .iter()
            .filter_map(|e| match e {
                BrokerEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }
}
