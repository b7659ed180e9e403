//! Broker events
//!
//! All connection-broker state changes are represented as events here.
//! Events are emitted by the broker and consumed by whatever drives the
//! presentation layer. Events are facts that happened, never mutated.

use serde::{Deserialize, Serialize};

use super::{CallbackErrorCode, Provider};

/// Kind of user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing notification surfaced by the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Domain events emitted by the connection broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BrokerEvent {
    /// An authorization flow was started and a consent surface opened
    AuthorizationStarted { provider: Provider },

    /// A handshake success was reconciled for a provider
    ConnectionEstablished { provider: Provider },

    /// A handshake failure was reconciled
    ConnectionFailed {
        provider: Option<Provider>,
        code: String,
    },

    /// A provider was disconnected on the server
    Disconnected { provider: Provider },

    /// An out-of-band sync job was requested
    SyncRequested { provider: Provider },

    /// The status cache was replaced by a successful refresh
    StatusRefreshed,

    /// A notification should be shown to the user
    Notified(Notification),
}

impl BrokerEvent {
    /// Get the event type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AuthorizationStarted { .. } => "authorization_started",
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::Disconnected { .. } => "disconnected",
            Self::SyncRequested { .. } => "sync_requested",
            Self::StatusRefreshed => "status_refreshed",
            Self::Notified(_) => "notified",
        }
    }

    /// Get the provider if this event is provider-scoped
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::AuthorizationStarted { provider }
            | Self::ConnectionEstablished { provider }
            | Self::Disconnected { provider }
            | Self::SyncRequested { provider } => Some(*provider),
            Self::ConnectionFailed { provider, .. } => *provider,
            Self::StatusRefreshed | Self::Notified(_) => None,
        }
    }

    /// Build the failure event for a callback error code
    pub fn connection_failed(provider: Option<Provider>, code: &CallbackErrorCode) -> Self {
        Self::ConnectionFailed {
            provider,
            code: code.as_str().to_string(),
        }
    }
}
