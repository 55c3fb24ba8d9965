//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → GET /            → page.rs (static test page)
//!     → GET <upgrade>    → upgrade subsystem → session task
//!     → anything else    → 404 / 405
//! ```

pub mod page;
pub mod server;

pub use server::{AppState, EchoServer};
