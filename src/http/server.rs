//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the page and upgrade handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Hand each successful upgrade to its own echo session task
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::rejection::WebSocketUpgradeRejection, ConnectInfo, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EchoConfig;
use crate::http::page;
use crate::lifecycle::StartupError;
use crate::net::connection::{Connection, ConnectionTracker};
use crate::session::{EchoSession, WsChannel};
use crate::upgrade::{HandshakeError, Upgrader};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upgrader: Arc<Upgrader>,
    pub tracker: ConnectionTracker,
    pub idle_timeout: Option<Duration>,
    pub page: Bytes,
}

/// HTTP server for the echo relay.
pub struct EchoServer {
    router: Router,
    config: EchoConfig,
    tracker: ConnectionTracker,
}

impl EchoServer {
    /// Create a new server with the given configuration.
    pub fn new(config: EchoConfig) -> Self {
        let tracker = ConnectionTracker::new();

        let state = AppState {
            upgrader: Arc::new(Upgrader::from_config(&config.upgrade)),
            tracker: tracker.clone(),
            idle_timeout: config.session.idle_timeout(),
            page: page::render(&config.upgrade.path),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            tracker,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EchoConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route(&config.upgrade.path, get(upgrade_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), StartupError> {
        let addr = listener.local_addr().map_err(StartupError::Serve)?;
        tracing::info!(
            address = %addr,
            upgrade_path = %self.config.upgrade.path,
            "Echo server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await
            .map_err(StartupError::Serve)?;

        let live = self.tracker.active_count();
        if live > 0 {
            tracing::info!(sessions = live, "Stopped accepting; sessions still open");
        }
        tracing::info!("Echo server stopped");
        Ok(())
    }

    /// A handle on the live-connection count.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// The router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn index_handler(State(state): State<AppState>) -> Html<Bytes> {
    Html(state.page)
}

/// Upgrade endpoint. Each accepted upgrade gets its own session task.
async fn upgrade_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let upgrade = match state.upgrader.negotiate(upgrade, &headers) {
        Ok(upgrade) => upgrade,
        Err(e) => {
            tracing::warn!(remote = %remote, error = %e, "Upgrade rejected");
            return e.into_response();
        }
    };

    let tracker = state.tracker.clone();
    let idle_timeout = state.idle_timeout;

    upgrade
        .on_failed_upgrade(move |e| {
            let e = HandshakeError::Transport(e);
            tracing::warn!(remote = %remote, error = %e, "Upgrade failed");
        })
        .on_upgrade(move |socket| async move {
            let connection = Connection::open(WsChannel::new(socket), remote, tracker.track());
            EchoSession::new(connection)
                .with_idle_timeout(idle_timeout)
                .run()
                .await;
        })
}
