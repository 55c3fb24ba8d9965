//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Bind the listener
//! - Report anything that prevents the server from starting
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{self, ConfigError, EchoConfig};

/// Failure before or while starting to serve. Always fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Command-line overrides applied on top of the file configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub bind_host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Resolve the effective configuration.
pub fn resolve_config(overrides: &Overrides) -> Result<EchoConfig, StartupError> {
    let mut config = match &overrides.config_path {
        Some(path) => config::load_config(path)?,
        None => EchoConfig::default(),
    };

    if overrides.bind_host.is_some() || overrides.port.is_some() {
        let (host, port) = split_host_port(&config.listener.bind_address);
        let host = overrides.bind_host.clone().unwrap_or(host);
        let port = overrides.port.map(|p| p.to_string()).unwrap_or(port);
        config.listener.bind_address = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
    }

    if let Some(level) = &overrides.log_level {
        config.observability.log_level = level.clone();
    }

    config::validate_config(&config).map_err(|e| StartupError::Config(ConfigError::Validation(e)))?;
    Ok(config)
}

fn split_host_port(address: &str) -> (String, String) {
    match address.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => (address.to_string(), "8080".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = resolve_config(&Overrides::default()).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn port_override_keeps_host() {
        let overrides = Overrides {
            port: Some(9001),
            ..Overrides::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9001");
    }

    #[test]
    fn host_override_keeps_port() {
        let overrides = Overrides {
            bind_host: Some("::1".to_string()),
            log_level: Some("debug".to_string()),
            ..Overrides::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.listener.bind_address, "[::1]:8080");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn bad_host_fails_validation() {
        let overrides = Overrides {
            bind_host: Some("no such host".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve_config(&overrides),
            Err(StartupError::Config(ConfigError::Validation(_)))
        ));
    }
}
