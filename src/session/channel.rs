//! Message channel seam between the echo loop and the transport.
//!
//! # Responsibilities
//! - Yield data messages in arrival order, hiding control frames
//! - Write one message at a time and flush it
//! - Run the closing handshake
//!
//! # Design Decisions
//! - Close frames surface as [`ReceiveError`], never as messages
//! - Pings are answered by the transport itself, so the echo loop stays a
//!   strict receive/send alternation

use std::future::Future;

use axum::extract::ws::{self, WebSocket};
use axum::BoxError;
use futures_util::SinkExt;
use thiserror::Error;

use crate::session::closure::{classify_close, classify_transport, Closure};
use crate::session::message::Message;

/// Why a receive produced no message.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// Peer closed the connection as part of normal teardown.
    #[error("connection closed: {0}")]
    Closed(Closure),

    /// Peer closed the connection reporting a fault.
    #[error("unexpected close: {0}")]
    UnexpectedClose(Closure),

    /// Protocol violation or transport failure.
    #[error("receive failed: {0}")]
    Protocol(#[source] BoxError),
}

/// Failure writing to the transport.
#[derive(Debug, Error)]
#[error("write failed: {0}")]
pub struct WriteError(#[source] pub BoxError);

impl WriteError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// Ordered, full-duplex stream of data messages with one peer.
pub trait MessageChannel: Send {
    /// Wait for the next data message.
    fn recv(&mut self) -> impl Future<Output = Result<Message, ReceiveError>> + Send;

    /// Write one message and flush it.
    fn send(&mut self, message: Message) -> impl Future<Output = Result<(), WriteError>> + Send;

    /// Complete (or start) the closing handshake and flush.
    fn close(&mut self) -> impl Future<Output = Result<(), WriteError>> + Send;
}

/// [`MessageChannel`] over an upgraded WebSocket.
pub struct WsChannel {
    socket: WebSocket,
}

impl WsChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl MessageChannel for WsChannel {
    async fn recv(&mut self) -> Result<Message, ReceiveError> {
        loop {
            match self.socket.recv().await {
                Some(Ok(ws::Message::Text(text))) => return Ok(Message::Text(text)),
                Some(Ok(ws::Message::Binary(bytes))) => return Ok(Message::Binary(bytes)),
                Some(Ok(ws::Message::Ping(_) | ws::Message::Pong(_))) => continue,
                Some(Ok(ws::Message::Close(frame))) => return Err(classify_close(frame)),
                Some(Err(e)) => return Err(classify_transport(e)),
                None => return Err(ReceiveError::Closed(Closure::abnormal())),
            }
        }
    }

    async fn send(&mut self, message: Message) -> Result<(), WriteError> {
        self.socket.send(message.into()).await.map_err(WriteError::new)
    }

    async fn close(&mut self) -> Result<(), WriteError> {
        SinkExt::close(&mut self.socket).await.map_err(WriteError::new)
    }
}
