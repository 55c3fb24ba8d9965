//! Protocol switch negotiation.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::WebSocketUpgrade;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::UpgradeConfig;
use crate::upgrade::origin::{self, OriginPolicy};

/// The protocol switch could not be negotiated.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Not a valid upgrade request (method, headers, or connection not upgradable).
    #[error("malformed upgrade request: {0}")]
    Malformed(#[from] WebSocketUpgradeRejection),

    /// The origin policy refused the request.
    #[error("origin not allowed: {}", .origin.as_deref().unwrap_or("<none>"))]
    OriginRejected { origin: Option<String> },

    /// The transport failed while completing the upgrade.
    #[error("upgrade failed: {0}")]
    Transport(#[source] axum::Error),
}

impl IntoResponse for HandshakeError {
    fn into_response(self) -> Response {
        match self {
            HandshakeError::Malformed(rejection) => rejection.into_response(),
            HandshakeError::OriginRejected { .. } => {
                (StatusCode::FORBIDDEN, "Origin not allowed").into_response()
            }
            HandshakeError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Validates upgrade requests and applies transport limits.
#[derive(Debug, Clone)]
pub struct Upgrader {
    policy: Arc<dyn OriginPolicy>,
    max_message_size: usize,
    max_frame_size: usize,
}

impl Upgrader {
    pub fn new(policy: Arc<dyn OriginPolicy>) -> Self {
        let defaults = UpgradeConfig::default();
        Self {
            policy,
            max_message_size: defaults.max_message_size,
            max_frame_size: defaults.max_frame_size,
        }
    }

    pub fn from_config(config: &UpgradeConfig) -> Self {
        Self {
            policy: origin::from_config(config),
            max_message_size: config.max_message_size,
            max_frame_size: config.max_frame_size,
        }
    }

    /// Check the request against the origin policy.
    pub fn check_origin(&self, headers: &HeaderMap) -> Result<(), HandshakeError> {
        let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
        let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

        if self.policy.allows(origin, host) {
            Ok(())
        } else {
            Err(HandshakeError::OriginRejected {
                origin: origin.map(str::to_string),
            })
        }
    }

    /// Validate an upgrade request.
    ///
    /// On success the returned upgrade is ready for `on_upgrade`, which writes
    /// the switching-protocols response. On failure nothing has been written
    /// and the error converts into the rejection response.
    pub fn negotiate(
        &self,
        upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
        headers: &HeaderMap,
    ) -> Result<WebSocketUpgrade, HandshakeError> {
        let upgrade = upgrade?;
        self.check_origin(headers)?;

        Ok(upgrade
            .max_message_size(self.max_message_size)
            .max_frame_size(self.max_frame_size))
    }
}
