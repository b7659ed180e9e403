//! Provider connection state
//!
//! The server is the sole owner of connection truth; these types are the
//! client-side read cache of what the server last reported. No field here
//! is ever written from a relayed handshake result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Provider;

/// Connection status for a single provider
///
/// Unified status enum for cache state and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No configuration exists on the server - this is the default
    #[default]
    NotConfigured,
    /// Configuration exists but monitoring is not active
    ConfiguredInactive,
    /// Connected and actively monitored
    Active,
    /// Connection reported as failing
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::ConfiguredInactive => "configured_inactive",
            Self::Active => "active",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "configured_inactive" => Self::ConfiguredInactive,
            "active" => Self::Active,
            "error" => Self::Error,
            _ => Self::NotConfigured,
        }
    }

    /// Check if the provider is usable for collection
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Per-provider entry in the backend's `GET /integrations/status` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStatusEntry {
    /// Configuration exists and monitoring is active
    pub connected: bool,
    /// Configuration exists (possibly inactive)
    pub configured: bool,
    /// Display identifier (mailbox address, watched folder id) - never a credential
    #[serde(default)]
    pub account_identifier: Option<String>,
    /// Set by the server-side sync job, read-only here
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    /// Monotonically non-decreasing, read-only here
    #[serde(default)]
    pub sync_count: u64,
    /// Server flagged the connection as failing
    #[serde(default)]
    pub error: bool,
}

/// Full status payload: provider id -> status entry
pub type StatusPayload = HashMap<Provider, ProviderStatusEntry>;

/// Cached connection state for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConnection {
    pub provider: Provider,
    pub status: ConnectionStatus,
    pub account_identifier: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub sync_count: u64,
}

impl ProviderConnection {
    /// An entry for a provider the server knows nothing about
    pub fn not_configured(provider: Provider) -> Self {
        Self {
            provider,
            status: ConnectionStatus::NotConfigured,
            account_identifier: None,
            last_sync_at: None,
            sync_count: 0,
        }
    }

    /// Derive cached state from a server status entry
    pub fn from_entry(provider: Provider, entry: &ProviderStatusEntry) -> Self {
        let status = if entry.error {
            ConnectionStatus::Error
        } else if entry.connected {
            ConnectionStatus::Active
        } else if entry.configured {
            ConnectionStatus::ConfiguredInactive
        } else {
            ConnectionStatus::NotConfigured
        };

        Self {
            provider,
            status,
            account_identifier: entry.account_identifier.clone(),
            last_sync_at: entry.last_sync,
            sync_count: entry.sync_count,
        }
    }
}
