//! Data messages carried by an upgraded connection.
//!
//! Only the two data kinds reach the echo loop. Control frames (ping, pong,
//! close) are consumed by the channel before a [`Message`] is produced.

use axum::body::Bytes;
use axum::extract::ws::{self, Utf8Bytes};

/// Discriminator of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Binary,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Binary => write!(f, "binary"),
        }
    }
}

/// A single data message with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// UTF-8 payload.
    Text(Utf8Bytes),
    /// Opaque payload.
    Binary(Bytes),
}

impl Message {
    pub fn text(text: impl Into<Utf8Bytes>) -> Self {
        Message::Text(text.into())
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Message::Binary(bytes.into())
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Text(_) => MessageKind::Text,
            Message::Binary(_) => MessageKind::Binary,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Message::Text(text) => text.as_str().len(),
            Message::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Message> for ws::Message {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => ws::Message::Text(text),
            Message::Binary(bytes) => ws::Message::Binary(bytes),
        }
    }
}
