//! Security and access configuration types.

use super::defaults::{default_cors_origins, default_guest_logins};
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Comma-separated list of allowed CORS origins, or "*" for permissive
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Whether the built-in `/v1/login` handoff endpoint is enabled.
    /// Embedding applications with their own auth layer disable this and
    /// mint tokens through `TokenStore` directly.
    #[serde(default = "default_guest_logins")]
    pub guest_logins: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            guest_logins: default_guest_logins(),
        }
    }
}
