//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limits)
//!     → connection.rs (state, in-flight requests, idle tracking)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Idle keep-alive connections are closed, busy ones never are

pub mod connection;
pub mod listener;

pub use connection::{ConnectionActivity, ConnectionId, ConnectionState};
pub use listener::{AcceptBackoff, Listener, ListenerError};
