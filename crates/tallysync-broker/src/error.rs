//! Broker error taxonomy
//!
//! Nothing here is fatal to the application; every failure is contained to
//! the provider it concerns and leaves other providers operable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    /// The backend could not produce an authorization URL
    #[error("failed to initiate connection: {detail}")]
    AuthUrlUnavailable { detail: String },

    /// The status refetch failed; the previous cache stays visible but stale
    #[error("integration status unavailable: {detail}")]
    StatusUnavailable { detail: String },

    /// A disconnect/test/sync/toggle request failed
    ///
    /// `detail` carries the server's error text verbatim when available.
    #[error("{detail}")]
    OperationFailed { detail: String },

    /// Opening the secondary interaction surface failed
    #[error("failed to open authorization window: {detail}")]
    SurfaceUnavailable { detail: String },
}

impl BrokerError {
    pub fn detail(&self) -> &str {
        match self {
            Self::AuthUrlUnavailable { detail }
            | Self::StatusUnavailable { detail }
            | Self::OperationFailed { detail }
            | Self::SurfaceUnavailable { detail } => detail,
        }
    }
}
