//! Configuration validation functions.

use super::Config;

/// Limits that keep the connect-time snapshot bounded. A misconfigured
/// deployment that replays thousands of chat messages per connect would
/// stall the whole connect/disconnect pipeline (every connect runs under
/// the global serialization lock).
const MAX_CHAT_BACKLOG_LIMIT: usize = 500;
const MAX_HISTORY_LIMIT: usize = 100;

/// Validate the loaded configuration.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.server.chat_backlog_limit > MAX_CHAT_BACKLOG_LIMIT {
        anyhow::bail!(
            "server.chat_backlog_limit must be at most {MAX_CHAT_BACKLOG_LIMIT} (got {})",
            config.server.chat_backlog_limit
        );
    }

    if config.server.history_limit > MAX_HISTORY_LIMIT {
        anyhow::bail!(
            "server.history_limit must be at most {MAX_HISTORY_LIMIT} (got {})",
            config.server.history_limit
        );
    }

    if let Some(motd) = &config.server.motd {
        if motd.len() > 1024 {
            anyhow::bail!(
                "server.motd must be at most 1024 bytes (got {})",
                motd.len()
            );
        }
    }

    if config.security.cors_origins.trim().is_empty() {
        anyhow::bail!("security.cors_origins must not be empty (use \"*\" for permissive)");
    }

    config.websocket.validate()?;

    if config.security.guest_logins && is_production_mode() {
        eprintln!(
            "SECURITY WARNING: guest logins are enabled in production.\n\
             Anyone who can reach /v1/login can mint a session for any username.\n\
             Disable with: export TABLE_FISH__SECURITY__GUEST_LOGINS=false"
        );
    }

    Ok(())
}

/// Detect if we're running in production mode.
///
/// Checks `TABLE_FISH__ENVIRONMENT` and the generic `PRODUCTION` / `PROD`
/// environment variables.
pub fn is_production_mode() -> bool {
    use std::env;

    if let Ok(mode) = env::var("TABLE_FISH__ENVIRONMENT") {
        let mode = mode.to_lowercase();
        return mode == "production" || mode == "prod";
    }

    env::var("TABLE_FISH_PRODUCTION").is_ok()
        || env::var("PRODUCTION").is_ok()
        || env::var("PROD").is_ok()
}
