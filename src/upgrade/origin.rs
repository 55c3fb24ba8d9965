//! Origin policies applied before a connection is upgraded.
//!
//! # Design Decisions
//! - Policies see only the `Origin` and `Host` headers
//! - Host comparison is ASCII case-insensitive, as for the host header itself
//! - [`AllowAny`] accepts cross-site pages; use it for local testing only

use std::sync::Arc;

use axum::http::Uri;

use crate::config::{OriginPolicyKind, UpgradeConfig};

/// Decides whether a page at `origin` may open a connection.
pub trait OriginPolicy: Send + Sync + std::fmt::Debug {
    /// `origin` and `host` are the raw header values, when present.
    fn allows(&self, origin: Option<&str>, host: Option<&str>) -> bool;
}

/// Accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl OriginPolicy for AllowAny {
    fn allows(&self, _origin: Option<&str>, _host: Option<&str>) -> bool {
        true
    }
}

/// Accepts requests without an `Origin` header, or whose origin host equals
/// the `Host` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameOrigin;

impl OriginPolicy for SameOrigin {
    fn allows(&self, origin: Option<&str>, host: Option<&str>) -> bool {
        let Some(origin) = origin else {
            return true;
        };
        let Some(host) = host else {
            return false;
        };

        origin
            .parse::<Uri>()
            .ok()
            .and_then(|uri| uri.authority().map(|a| a.as_str().eq_ignore_ascii_case(host)))
            .unwrap_or(false)
    }
}

/// Accepts only origins from a fixed list.
#[derive(Debug, Clone)]
pub struct AllowList {
    origins: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            origins: origins.into_iter().map(|o| normalize(o.as_ref())).collect(),
        }
    }
}

impl OriginPolicy for AllowList {
    fn allows(&self, origin: Option<&str>, _host: Option<&str>) -> bool {
        match origin {
            Some(origin) => {
                let origin = normalize(origin);
                self.origins.iter().any(|allowed| *allowed == origin)
            }
            None => false,
        }
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Build the configured policy.
pub fn from_config(config: &UpgradeConfig) -> Arc<dyn OriginPolicy> {
    match config.origin_policy {
        OriginPolicyKind::Any => Arc::new(AllowAny),
        OriginPolicyKind::SameOrigin => Arc::new(SameOrigin),
        OriginPolicyKind::AllowList => Arc::new(AllowList::new(&config.allowed_origins)),
    }
}
