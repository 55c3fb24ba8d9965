//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sessions, upgrader and server produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stdout (fmt layer)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`connection_id`, `remote`) on every connection event
//! - Text payloads are logged in full; binary payloads only by size

pub mod logging;

pub use logging::init_logging;
