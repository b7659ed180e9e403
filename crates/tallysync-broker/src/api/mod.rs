//! Backend API seam
//!
//! The backend issues authorization URLs, performs the token exchange,
//! stores credentials, and answers status queries. This trait is the
//! broker's view of that collaborator; tests substitute scripted
//! implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tallysync_core::{Provider, StatusPayload};

mod http;

pub use http::HttpIntegrationsBackend;

/// Result of a connectivity probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub success: bool,
    pub message: String,
}

/// Result of toggling monitoring on/off
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub is_active: bool,
    pub message: String,
}

/// Backend endpoints the broker consumes
#[async_trait]
pub trait IntegrationsBackend: Send + Sync {
    /// Fetch connection status for all providers
    async fn status(&self) -> anyhow::Result<StatusPayload>;

    /// Request a provider-specific authorization URL
    async fn auth_url(&self, provider: Provider) -> anyhow::Result<String>;

    /// Remove the provider's stored configuration
    ///
    /// Returns the server's confirmation message.
    async fn disconnect(&self, provider: Provider) -> anyhow::Result<String>;

    /// Probe connectivity without changing stored state
    async fn test(&self, provider: Provider) -> anyhow::Result<TestOutcome>;

    /// Trigger an out-of-band sync job
    async fn sync(&self, provider: Provider) -> anyhow::Result<()>;

    /// Toggle monitoring on/off for a configured provider
    async fn toggle(&self, provider: Provider) -> anyhow::Result<ToggleOutcome>;
}
