//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing macros (structured events)
//!     → logging.rs (verbosity filter, text/JSON formatting)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields (remote address, URL, status) instead of formatted strings
//! - One verbosity knob gates every log category

pub mod logging;

pub use logging::{LogFormat, Verbosity};
