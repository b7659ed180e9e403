//! # TallySync Core Library
//!
//! Domain types and events for the TallySync integration connection broker.
//!
//! ## Modules
//!
//! - `branding` - Centralized branding constants
//! - `domain` - Core entities (Provider, ProviderConnection, relay messages)
//! - `event_bus` - Central event distribution system

pub mod branding;
pub mod domain;
pub mod event_bus;

// Re-export commonly used types
pub use domain::*;

// Event-driven architecture exports
pub use event_bus::{create_shared_event_bus, EventBus, EventReceiver, EventSender, SharedEventBus};
