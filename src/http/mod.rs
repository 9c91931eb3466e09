//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, timeouts, shutdown)
//!     → middleware/logging.rs (received / answered lines)
//!     → middleware/credentials.rs or middleware/content_filter.rs
//!     → handlers.rs (greeting, favicon)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{HttpServer, ServerError};
