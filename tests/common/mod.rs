//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use echo_relay::net::ConnectionTracker;
use echo_relay::{EchoConfig, EchoServer, Shutdown};
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WAIT: Duration = Duration::from_secs(5);

/// An echo server running on an ephemeral port. Shuts down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub tracker: ConnectionTracker,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(config: EchoConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = EchoServer::new(config);
        let tracker = server.tracker();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();

        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            tracker,
            shutdown,
        }
    }

    pub async fn start_default() -> Self {
        Self::start(EchoConfig::default()).await
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn connect(&self) -> Client {
        let (client, _) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .expect("upgrade failed");
        client
    }

    /// Wait until every server-side connection has been released.
    pub async fn wait_idle(&self) {
        tokio::time::timeout(WAIT, self.tracker.wait_idle())
            .await
            .expect("connections were not released");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Next message from the server, failing the test on timeout or stream end.
pub async fn next_message(client: &mut Client) -> Message {
    tokio::time::timeout(WAIT, client.next())
        .await
        .expect("timed out waiting for echo")
        .expect("stream ended")
        .expect("websocket error")
}
