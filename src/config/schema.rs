//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the echo server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the echo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EchoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upgrade endpoint and handshake policy.
    pub upgrade: UpgradeConfig,

    /// Per-connection session settings.
    pub session: SessionConfig,

    /// Timeout configuration for plain HTTP requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which origins may open a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OriginPolicyKind {
    /// Accept every origin. Only suitable for local testing.
    #[default]
    Any,
    /// Origin host must equal the Host header.
    SameOrigin,
    /// Origin must appear in `allowed_origins`.
    AllowList,
}

/// Upgrade endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// Path of the upgrade endpoint.
    pub path: String,

    /// Origin policy applied before upgrading.
    pub origin_policy: OriginPolicyKind,

    /// Origins accepted by the allow-list policy.
    pub allowed_origins: Vec<String>,

    /// Largest message accepted from a peer, in bytes.
    pub max_message_size: usize,

    /// Largest single frame accepted from a peer, in bytes.
    pub max_frame_size: usize,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            path: "/ws".to_string(),
            origin_policy: OriginPolicyKind::Any,
            allowed_origins: Vec::new(),
            max_message_size: 64 << 20,
            max_frame_size: 16 << 20,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Close a connection after this many seconds without a message (0 = never).
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for plain HTTP requests in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
