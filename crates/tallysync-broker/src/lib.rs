//! # TallySync Connection Broker
//!
//! Lets an administrator authorize the application to access a third-party
//! account (email inbox, Drive folder) without the client ever handling
//! long-lived secrets. The backend owns the token exchange and storage;
//! this crate coordinates the client side of the handshake:
//!
//! - requesting an authorization URL and opening a consent surface
//! - resolving the authorization redirect (relay to opener, or apply
//!   locally on same-tab completion)
//! - reconciling relayed results without ever trusting them as state
//! - keeping a server-authoritative status cache
//! - disconnect / test / sync / toggle operations
//!
//! Visible connection state is only ever set from a status refetch, never
//! from a relayed message.

pub mod api;
pub mod broker;
pub mod callback;
pub mod config;
pub mod error;
pub mod pending;
pub mod status;
pub mod surface;

pub use api::{HttpIntegrationsBackend, IntegrationsBackend, TestOutcome, ToggleOutcome};
pub use broker::{ConnectionBroker, InboxGuard};
pub use callback::{CallbackContext, CallbackDisposition, CallbackSignal};
pub use config::BrokerConfig;
pub use error::BrokerError;
pub use pending::{PendingAuthorization, PendingSet};
pub use status::{StatusSnapshot, StatusStore};
pub use surface::{ChannelRelayTarget, InteractionSurface, RelayTarget, SurfaceOpener};
