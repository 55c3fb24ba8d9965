//! Connection identity, state and lifetime tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for logging
//! - Own the upgraded channel and its open/closed state
//! - Count live connections and let callers wait for them to drain
//!
//! # Design Decisions
//! - A [`Connection`] is moved into exactly one session; it is never shared
//! - Release happens on drop, so it runs once on every exit path
//! - Closing is idempotent; only the first call touches the transport

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::close_code;
use tokio::sync::watch;

use crate::session::channel::{MessageChannel, ReceiveError, WriteError};
use crate::session::closure::Closure;
use crate::session::message::Message;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgraded and usable.
    Open,
    /// Closing handshake done or attempted; no further traffic.
    Closed,
}

/// One upgraded channel and the peer it talks to.
pub struct Connection<C> {
    id: ConnectionId,
    remote: SocketAddr,
    state: ConnectionState,
    channel: C,
    _guard: ConnectionGuard,
}

impl<C: MessageChannel> Connection<C> {
    /// Wrap a freshly upgraded channel. The connection starts [`ConnectionState::Open`].
    pub fn open(channel: C, remote: SocketAddr, guard: ConnectionGuard) -> Self {
        Self {
            id: guard.id(),
            remote,
            state: ConnectionState::Open,
            channel,
            _guard: guard,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Wait for the next data message from the peer.
    pub async fn recv(&mut self) -> Result<Message, ReceiveError> {
        if !self.is_open() {
            return Err(ReceiveError::Closed(Closure::new(close_code::NORMAL, "")));
        }
        self.channel.recv().await
    }

    /// Send one message to the peer.
    pub async fn send(&mut self, message: Message) -> Result<(), WriteError> {
        if !self.is_open() {
            return Err(WriteError::new("connection already closed"));
        }
        self.channel.send(message).await
    }

    /// Close the connection. Calls after the first are no-ops.
    pub async fn close(&mut self) {
        if !self.is_open() {
            tracing::trace!(connection_id = %self.id, "Close requested on closed connection");
            return;
        }
        self.state = ConnectionState::Closed;

        if let Err(e) = self.channel.close().await {
            tracing::debug!(
                connection_id = %self.id,
                remote = %self.remote,
                error = %e,
                "Closing handshake did not complete"
            );
        }
    }
}

/// Tracks live connections.
///
/// Uses a watch channel so callers can wait for the count to reach zero.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<watch::Sender<u64>>,
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    /// Record a new live connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active.send_modify(|count| *count += 1);
        ConnectionGuard {
            active: Arc::clone(&self.active),
            id: ConnectionId::new(),
        }
    }

    /// Get current live connection count.
    pub fn active_count(&self) -> u64 {
        *self.active.borrow()
    }

    /// Wait until no connections are live.
    pub async fn wait_idle(&self) {
        let mut rx = self.active.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements the live count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<watch::Sender<u64>>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.send_modify(|count| *count -= 1);
        tracing::trace!(connection_id = %self.id, "Connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[test]
    fn connection_tracker_counts() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        assert_eq!(tracker.active_count(), 1);

        let guard2 = tracker.track();
        assert_eq!(tracker.active_count(), 2);
        assert_ne!(guard1.id(), guard2.id());

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn wait_idle_returns_after_last_release() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("tracker never went idle")
            .unwrap();
    }
}
