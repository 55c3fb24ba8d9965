//! Connection upgrade subsystem.
//!
//! # Data Flow
//! ```text
//! GET /ws (Upgrade: websocket)
//!     → axum WebSocketUpgrade extractor (method + header validation)
//!     → origin.rs (OriginPolicy: any / same-origin / allow-list)
//!     → handshake.rs (Upgrader: limits, HandshakeError → 4xx response)
//!     → 101 Switching Protocols, socket handed to a new session
//! ```
//!
//! # Design Decisions
//! - A failed handshake is terminal for that request; nothing is retried
//! - No connection or session exists until the upgrade succeeds
//! - The origin policy is pluggable; the default accepts every origin

pub mod handshake;
pub mod origin;

pub use handshake::{HandshakeError, Upgrader};
pub use origin::{AllowAny, AllowList, OriginPolicy, SameOrigin};
