//! Connection broker integration tests
//!
//! Exercises the full client-side handshake against scripted fakes: flow
//! initiation, relay and same-tab reconciliation, and the disconnect /
//! test / sync / toggle operations.

mod connection;
