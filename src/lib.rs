//! WebSocket echo relay.
//!
//! Upgrades HTTP requests to WebSocket connections and mirrors every text or
//! binary message back to the peer that sent it, one task per connection.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;
pub mod upgrade;

pub use config::EchoConfig;
pub use http::EchoServer;
pub use lifecycle::Shutdown;
