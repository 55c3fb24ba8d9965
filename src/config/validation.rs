//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes and timeouts > 0, addresses parse)
//! - Check that the upgrade path does not shadow the test page
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EchoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{EchoConfig, OriginPolicyKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error(
        "upgrade.path {0:?} must start with '/', must not be '/', and may only use letters, digits and -._~/"
    )]
    UpgradePath(String),

    #[error("upgrade.allowed_origins must not be empty with the allow-list policy")]
    EmptyAllowList,

    #[error("upgrade.{0} must be greater than zero")]
    ZeroSize(&'static str),

    #[error("upgrade.max_frame_size ({frame}) exceeds upgrade.max_message_size ({message})")]
    FrameExceedsMessage { frame: usize, message: usize },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Unreserved URL characters and `/` only. Rules out route captures and
/// anything that needs escaping in the page or on the wire.
fn is_literal_path(path: &str) -> bool {
    path.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'/'))
}

/// Check a parsed configuration.
pub fn validate_config(config: &EchoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let upgrade = &config.upgrade;
    if !upgrade.path.starts_with('/') || upgrade.path == "/" || !is_literal_path(&upgrade.path) {
        errors.push(ValidationError::UpgradePath(upgrade.path.clone()));
    }

    if upgrade.origin_policy == OriginPolicyKind::AllowList && upgrade.allowed_origins.is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }

    if upgrade.max_message_size == 0 {
        errors.push(ValidationError::ZeroSize("max_message_size"));
    }
    if upgrade.max_frame_size == 0 {
        errors.push(ValidationError::ZeroSize("max_frame_size"));
    }
    if upgrade.max_frame_size > upgrade.max_message_size {
        errors.push(ValidationError::FrameExceedsMessage {
            frame: upgrade.max_frame_size,
            message: upgrade.max_message_size,
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
