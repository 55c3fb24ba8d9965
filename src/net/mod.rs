//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured bind address
//!     → listener.rs (bind, fatal on failure)
//!     → axum accept loop (one task per HTTP connection)
//!     → connection.rs (Connection per upgraded socket, tracked until dropped)
//!
//! Connection States:
//!     Open → Closed
//! ```
//!
//! # Design Decisions
//! - Each upgraded connection is tracked so shutdown can report what is live
//! - Identifiers are process-local counters, rendered as `conn-N` in logs

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionGuard, ConnectionId, ConnectionState, ConnectionTracker};
