//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over configuration so operators can raise verbosity ad hoc
//! - The configured level applies to this crate and to tower_http

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directives for a configured log level.
pub fn default_directives(level: &str) -> String {
    format!("echo_relay={level},tower_http={level}")
}

/// Build the filter, preferring `RUST_LOG` when it is set.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)))
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_crate_and_http_layer() {
        assert_eq!(default_directives("debug"), "echo_relay=debug,tower_http=debug");
    }
}
