//! Core domain entities

pub mod connection;
pub mod event;
pub mod provider;
pub mod relay;

pub use connection::*;
pub use event::*;
pub use provider::*;
pub use relay::*;
