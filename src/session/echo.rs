//! The echo loop for one connection.

use std::time::Duration;

use crate::net::connection::Connection;
use crate::session::channel::{MessageChannel, ReceiveError, WriteError};
use crate::session::closure::Closure;
use crate::session::message::Message;

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// Peer closed as part of normal teardown.
    Closed(Closure),
    /// Peer reported a fault or the transport failed while receiving.
    ReceiveFailed(ReceiveError),
    /// Echoing a message back failed.
    WriteFailed(WriteError),
    /// No message arrived within the idle timeout.
    IdleTimeout,
}

impl SessionEnd {
    /// Whether the session ended without a fault worth reporting.
    pub fn is_clean(&self) -> bool {
        matches!(self, SessionEnd::Closed(_) | SessionEnd::IdleTimeout)
    }
}

/// Drives the receive/echo loop for exactly one [`Connection`].
pub struct EchoSession<C> {
    connection: Connection<C>,
    idle_timeout: Option<Duration>,
}

impl<C: MessageChannel> EchoSession<C> {
    pub fn new(connection: Connection<C>) -> Self {
        Self {
            connection,
            idle_timeout: None,
        }
    }

    /// End the session when the peer stays silent for longer than `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Run until the peer closes or the transport fails.
    ///
    /// The connection is closed once and released when this returns.
    pub async fn run(mut self) -> SessionEnd {
        let id = self.connection.id();
        let remote = self.connection.remote();
        tracing::info!(connection_id = %id, remote = %remote, "Client connected");

        let end = self.echo_loop().await;

        match &end {
            SessionEnd::Closed(closure) => {
                tracing::debug!(connection_id = %id, code = closure.code, "Peer closed connection");
            }
            SessionEnd::IdleTimeout => {
                tracing::info!(connection_id = %id, remote = %remote, "Idle timeout reached");
            }
            SessionEnd::ReceiveFailed(ReceiveError::UnexpectedClose(closure)) => {
                tracing::error!(
                    connection_id = %id,
                    remote = %remote,
                    code = closure.code,
                    reason = %closure.reason,
                    "Unexpected close"
                );
            }
            SessionEnd::ReceiveFailed(e) => {
                tracing::error!(connection_id = %id, remote = %remote, error = %e, "Receive error");
            }
            SessionEnd::WriteFailed(e) => {
                tracing::error!(connection_id = %id, remote = %remote, error = %e, "Write error");
            }
        }

        self.connection.close().await;
        tracing::info!(connection_id = %id, remote = %remote, "Client disconnected");
        end
    }

    async fn echo_loop(&mut self) -> SessionEnd {
        loop {
            let message = match self.next_message().await {
                Ok(message) => message,
                Err(end) => return end,
            };

            match &message {
                Message::Text(text) => tracing::info!(
                    connection_id = %self.connection.id(),
                    text = %text.as_str(),
                    "Received (text)"
                ),
                Message::Binary(bytes) => tracing::info!(
                    connection_id = %self.connection.id(),
                    bytes = bytes.len(),
                    "Received (binary)"
                ),
            }

            if let Err(e) = self.connection.send(message).await {
                return SessionEnd::WriteFailed(e);
            }
        }
    }

    async fn next_message(&mut self) -> Result<Message, SessionEnd> {
        let received = match self.idle_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.connection.recv())
                .await
                .map_err(|_| SessionEnd::IdleTimeout)?,
            None => self.connection.recv().await,
        };

        received.map_err(|e| match e {
            ReceiveError::Closed(closure) => SessionEnd::Closed(closure),
            other => SessionEnd::ReceiveFailed(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::connection::{ConnectionState, ConnectionTracker};
    use crate::session::testing::{Inbound, ScriptedChannel};
    use axum::extract::ws::close_code;

    fn session(channel: ScriptedChannel, tracker: &ConnectionTracker) -> EchoSession<ScriptedChannel> {
        let remote = "127.0.0.1:40000".parse().unwrap();
        EchoSession::new(Connection::open(channel, remote, tracker.track()))
    }

    #[tokio::test]
    async fn echoes_each_message_unchanged() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![
            Inbound::Message(Message::text("ping")),
            Inbound::Message(Message::binary(vec![0x00, 0xFF, 0x10])),
            Inbound::Message(Message::text("")),
            Inbound::Close(Closure::new(close_code::NORMAL, "")),
        ]);

        let end = session(channel, &tracker).run().await;

        assert!(matches!(end, SessionEnd::Closed(ref c) if c.code == close_code::NORMAL));
        assert!(end.is_clean());
        let log = log.lock().unwrap();
        assert_eq!(
            log.sent,
            vec![
                Message::text("ping"),
                Message::binary(vec![0x00, 0xFF, 0x10]),
                Message::text(""),
            ]
        );
        assert_eq!(log.closes, 1);
    }

    #[tokio::test]
    async fn strict_alternation_between_receive_and_send() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![
            Inbound::Message(Message::text("a")),
            Inbound::Message(Message::text("b")),
            Inbound::Message(Message::text("c")),
            Inbound::Close(Closure::abnormal()),
        ]);

        session(channel, &tracker).run().await;

        let log = log.lock().unwrap();
        assert_eq!(
            log.events,
            vec!["recv", "send:a", "recv", "send:b", "recv", "send:c", "recv", "close"]
        );
    }

    #[tokio::test]
    async fn write_failure_ends_session() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![
            Inbound::Message(Message::text("first")),
            Inbound::Message(Message::text("never read")),
        ]);
        let channel = channel.failing_sends();

        let end = session(channel, &tracker).run().await;

        assert!(matches!(end, SessionEnd::WriteFailed(_)));
        assert!(!end.is_clean());
        let log = log.lock().unwrap();
        assert_eq!(log.events, vec!["recv", "send:first", "close"]);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn unexpected_close_is_reported() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![Inbound::Close(Closure::new(
            close_code::PROTOCOL,
            "bad frame",
        ))]);

        let end = session(channel, &tracker).run().await;

        assert!(matches!(
            end,
            SessionEnd::ReceiveFailed(ReceiveError::UnexpectedClose(ref c)) if c.code == close_code::PROTOCOL
        ));
        assert!(log.lock().unwrap().sent.is_empty());
    }

    #[tokio::test]
    async fn abrupt_disconnect_releases_connection() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![]);

        let end = session(channel, &tracker).run().await;

        assert!(matches!(end, SessionEnd::Closed(ref c) if *c == Closure::abnormal()));
        let log = log.lock().unwrap();
        assert!(log.sent.is_empty());
        assert_eq!(log.closes, 1);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timeout_ends_silent_session() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![
            Inbound::Message(Message::text("hello")),
            Inbound::Pending,
        ]);

        let end = session(channel, &tracker)
            .with_idle_timeout(Some(Duration::from_secs(5)))
            .run()
            .await;

        assert!(matches!(end, SessionEnd::IdleTimeout));
        let log = log.lock().unwrap();
        assert_eq!(log.sent, vec![Message::text("hello")]);
        assert_eq!(log.closes, 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let tracker = ConnectionTracker::new();
        let (channel, log) = ScriptedChannel::new(vec![]);
        let remote = "127.0.0.1:40001".parse().unwrap();
        let mut connection = Connection::open(channel, remote, tracker.track());

        assert_eq!(connection.state(), ConnectionState::Open);
        connection.close().await;
        connection.close().await;

        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(log.lock().unwrap().closes, 1);
        assert!(connection.send(Message::text("late")).await.is_err());
        assert!(log.lock().unwrap().sent.is_empty());

        drop(connection);
        assert_eq!(tracker.active_count(), 0);
    }
}
