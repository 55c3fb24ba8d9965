//! Echo session subsystem.
//!
//! # Data Flow
//! ```text
//! Upgraded WebSocket
//!     → channel.rs (WsChannel: data messages in, control frames handled)
//!     → echo.rs (EchoSession: receive → log → send, until closure)
//!     → closure.rs (expected vs. unexpected endings)
//!     → Connection closed and released
//! ```
//!
//! # Design Decisions
//! - One task per connection; sessions share nothing
//! - Strict alternation: every received message is echoed before the next
//!   receive, so ordering needs no extra bookkeeping
//! - Sessions are generic over [`MessageChannel`] so the loop can be tested
//!   without sockets

pub mod channel;
pub mod closure;
pub mod echo;
pub mod message;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{MessageChannel, ReceiveError, WriteError, WsChannel};
pub use closure::Closure;
pub use echo::{EchoSession, SessionEnd};
pub use message::{Message, MessageKind};
