//! WebSocket Echo Relay
//!
//! Serves a browser test page at `/` and echoes every WebSocket message
//! received on the upgrade path back to its sender.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     ECHO RELAY                       │
//!                 │                                                      │
//!   GET /         │  ┌──────────┐    ┌──────────┐    ┌──────────────┐    │
//!  ───────────────┼─▶│   net    │───▶│   http   │───▶│  test page   │    │
//!                 │  │ listener │    │  router  │    └──────────────┘    │
//!                 │  └──────────┘    └────┬─────┘                        │
//!   GET /ws       │                       │         ┌──────────────┐     │
//!  ───────────────┼──────────────────────▶├────────▶│   upgrade    │     │
//!                 │                       │         │  (origin,    │     │
//!                 │                       │         │   limits)    │     │
//!                 │                       │         └──────┬───────┘     │
//!                 │                       │                ▼             │
//!   messages      │                       │         ┌──────────────┐     │
//!  ◀──────────────┼───────────────────────┼─────────│ echo session │     │
//!  ───────────────┼───────────────────────┼────────▶│ (task/conn)  │     │
//!                 │                                 └──────────────┘     │
//!                 │  config · lifecycle · observability                  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use echo_relay::config::{EchoConfig, ObservabilityConfig};
use echo_relay::lifecycle::{resolve_config, signals, Overrides, Shutdown, StartupError};
use echo_relay::net::listener;
use echo_relay::observability::init_logging;
use echo_relay::EchoServer;

/// WebSocket echo relay
#[derive(Parser, Debug)]
#[command(name = "echo-relay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configured bind address)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host or IP to bind (overrides the configured bind address)
    #[arg(long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(self) -> Overrides {
        Overrides {
            config_path: self.config,
            bind_host: self.bind,
            port: self.port,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let overrides = Args::parse().overrides();

    let config = match resolve_config(&overrides) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig {
                log_level: overrides.log_level.unwrap_or_else(|| "info".to_string()),
            });
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!("echo-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: EchoConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upgrade_path = %config.upgrade.path,
        origin_policy = ?config.upgrade.origin_policy,
        "Configuration loaded"
    );

    let listener = listener::bind(&config.listener).await?;
    let port = listener.local_addr().map_err(StartupError::Serve)?.port();
    tracing::info!("Open http://localhost:{} in your browser", port);

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = EchoServer::new(config);
    server.run(listener, shutdown.subscribe()).await
}
