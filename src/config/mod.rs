//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (bind host / port / log level)
//!     → EchoConfig (validated, immutable)
//!     → read once at startup to build the router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EchoConfig, ListenerConfig, ObservabilityConfig, OriginPolicyKind, SessionConfig,
    TimeoutConfig, UpgradeConfig,
};
pub use validation::{validate_config, ValidationError};
