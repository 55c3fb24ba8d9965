//! Close classification.
//!
//! # Responsibilities
//! - Decide whether a peer close code is expected or a fault
//! - Map transport errors seen while receiving onto the same split
//!
//! # Design Decisions
//! - NORMAL, GOING AWAY, NO STATUS and ABNORMAL are expected; every other code
//!   is reported
//! - A dropped TCP connection without a close frame counts as ABNORMAL
//! - Disconnect errors are recognised by type, and by their rendered text when
//!   axum wraps a tungstenite release other than ours
//! - Classification only decides logging; every path still ends the session

use std::io;

use axum::extract::ws::{close_code, CloseFrame};
use tokio_tungstenite::tungstenite;

use crate::session::channel::ReceiveError;

/// Close code used when a close frame carried no status.
pub const NO_STATUS: u16 = close_code::STATUS;

/// How a peer ended the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    /// RFC 6455 close code.
    pub code: u16,
    /// Reason text sent by the peer (may be empty).
    pub reason: String,
}

impl Closure {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// The peer went away without a closing handshake.
    pub fn abnormal() -> Self {
        Self::new(close_code::ABNORMAL, "")
    }

    /// Whether this closure is part of normal connection teardown.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.code,
            close_code::NORMAL | close_code::AWAY | close_code::STATUS | close_code::ABNORMAL
        )
    }
}

impl std::fmt::Display for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reason.is_empty() {
            write!(f, "close {}", self.code)
        } else {
            write!(f, "close {} ({})", self.code, self.reason)
        }
    }
}

/// Classify a close frame received from the peer.
pub fn classify_close(frame: Option<CloseFrame>) -> ReceiveError {
    let closure = match frame {
        Some(frame) => Closure::new(frame.code, frame.reason.as_str()),
        None => Closure::new(NO_STATUS, ""),
    };

    if closure.is_expected() {
        ReceiveError::Closed(closure)
    } else {
        ReceiveError::UnexpectedClose(closure)
    }
}

/// Classify an error returned by the transport while waiting for a message.
pub fn classify_transport(err: axum::Error) -> ReceiveError {
    let inner = err.into_inner();

    let disconnected = match inner.downcast_ref::<tungstenite::Error>() {
        Some(ws_err) => is_disconnect(ws_err),
        None => match find_io_error(&*inner) {
            Some(io_err) => is_disconnect_io(io_err),
            None => renders_as_disconnect(&*inner),
        },
    };

    if disconnected {
        ReceiveError::Closed(Closure::abnormal())
    } else {
        ReceiveError::Protocol(inner)
    }
}

fn is_disconnect(err: &tungstenite::Error) -> bool {
    use tungstenite::error::ProtocolError;

    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => true,
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
        tungstenite::Error::Io(io_err) => is_disconnect_io(io_err),
        _ => false,
    }
}

fn is_disconnect_io(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Match a tungstenite error from another release by its message.
fn renders_as_disconnect(err: &(dyn std::error::Error + 'static)) -> bool {
    use tungstenite::error::ProtocolError;

    let rendered = err.to_string();
    [
        tungstenite::Error::ConnectionClosed,
        tungstenite::Error::AlreadyClosed,
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake),
    ]
    .iter()
    .any(|known| known.to_string() == rendered)
}

fn find_io_error<'a>(
    mut err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a io::Error> {
    loop {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        err = err.source()?;
    }
}
