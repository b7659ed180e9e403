//! Cross-context relay messages
//!
//! The authorization handshake finishes in a secondary browsing context
//! (popup) that cannot share memory with the application. Its only channel
//! back is an origin-tagged message. These types model that contract.
//!
//! A relayed result is a *trigger*, never a source of truth: it is never
//! persisted, and visible connection state only changes through a status
//! refetch.

use serde::{Deserialize, Serialize};

use super::Provider;

/// Message type marker for a successful handshake
pub const MSG_INTEGRATION_SUCCESS: &str = "INTEGRATION_SUCCESS";
/// Message type marker for a failed handshake
pub const MSG_INTEGRATION_ERROR: &str = "INTEGRATION_ERROR";

/// Error codes the authorization callback can report
///
/// The code set comes from the backend's redirect markers. Anything not in
/// the known set maps to a generic message rather than failing silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackErrorCode {
    MissingParams,
    InvalidState,
    TokenExchangeFailed,
    ServerError,
    AccessDenied,
    Other(String),
}

impl CallbackErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "missing_params" => Self::MissingParams,
            "invalid_state" => Self::InvalidState,
            "token_exchange_failed" => Self::TokenExchangeFailed,
            "server_error" => Self::ServerError,
            "access_denied" => Self::AccessDenied,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingParams => "missing_params",
            Self::InvalidState => "invalid_state",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::ServerError => "server_error",
            Self::AccessDenied => "access_denied",
            Self::Other(code) => code,
        }
    }

    /// Human-readable text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingParams => "OAuth callback missing required parameters.",
            Self::InvalidState => "Invalid OAuth state. Please try again.",
            Self::TokenExchangeFailed => "Failed to exchange authorization code.",
            Self::ServerError => "A server error occurred. Please try again.",
            Self::AccessDenied => "Access was denied. Please authorize the application.",
            Self::Other(_) => "An error occurred during authentication.",
        }
    }
}

/// Terminal handshake result, decoded from a relay message or callback URL
#[derive(Debug, Clone, PartialEq)]
pub enum RelayedResult {
    Success {
        provider: Provider,
    },
    Error {
        /// The error marker does not always name a provider
        provider: Option<Provider>,
        code: CallbackErrorCode,
    },
}

impl RelayedResult {
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::Success { provider } => Some(*provider),
            Self::Error { provider, .. } => *provider,
        }
    }
}

/// Wire form of the cross-context message
///
/// Matches the contract the callback context posts to its opener:
/// `{ type: "INTEGRATION_SUCCESS" | "INTEGRATION_ERROR", provider?, error? }`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayMessage {
    pub fn success(provider: Provider) -> Self {
        Self {
            kind: MSG_INTEGRATION_SUCCESS.to_string(),
            provider: Some(provider.as_str().to_string()),
            error: None,
        }
    }

    pub fn error(provider: Option<Provider>, code: &CallbackErrorCode) -> Self {
        Self {
            kind: MSG_INTEGRATION_ERROR.to_string(),
            provider: provider.map(|p| p.as_str().to_string()),
            error: Some(code.as_str().to_string()),
        }
    }

    /// Decode into a result, or `None` for malformed/unrelated messages
    ///
    /// A success message naming an unknown provider is malformed: it must
    /// not produce a success result.
    pub fn decode(&self) -> Option<RelayedResult> {
        match self.kind.as_str() {
            MSG_INTEGRATION_SUCCESS => {
                let provider = Provider::parse(self.provider.as_deref()?)?;
                Some(RelayedResult::Success { provider })
            }
            MSG_INTEGRATION_ERROR => {
                let code = CallbackErrorCode::parse(self.error.as_deref().unwrap_or(""));
                let provider = self.provider.as_deref().and_then(Provider::parse);
                Some(RelayedResult::Error { provider, code })
            }
            _ => None,
        }
    }
}

/// Origin of a browsing context, compared with exact equality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin(String);

impl Origin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A relay message together with the origin that sent it
///
/// The origin is attached by the transport, not the sender's payload, so a
/// forged payload cannot claim a different origin.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: Origin,
    pub message: RelayMessage,
}
