//! TCP listener binding.
//!
//! # Responsibilities
//! - Parse the configured bind address
//! - Bind the listening socket
//!
//! # Design Decisions
//! - Binding failure is fatal to the process; it is neither retried nor recovered
//! - The bound listener is handed to axum, which owns the accept loop

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::lifecycle::startup::StartupError;

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e| StartupError::Bind {
            address: config.bind_address.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        address: config.bind_address.clone(),
        source,
    })?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".to_string(),
        };
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn port_in_use_is_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ListenerConfig {
            bind_address: taken.local_addr().unwrap().to_string(),
        };
        assert!(matches!(bind(&config).await, Err(StartupError::Bind { .. })));
    }

    #[tokio::test]
    async fn unparsable_address_is_bind_error() {
        let config = ListenerConfig {
            bind_address: "not-an-address".to_string(),
        };
        assert!(matches!(bind(&config).await, Err(StartupError::Bind { .. })));
    }
}
