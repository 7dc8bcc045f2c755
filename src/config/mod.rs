//! Configuration module for Table Fish.
//!
//! Supports JSON configuration files, environment variable overrides, and
//! sensible compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`server`]: Snapshot behavior (chat backlog, history, MOTD)
//! - [`security`]: CORS and login handoff settings
//! - [`websocket`]: Per-connection websocket tuning
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

// Submodules
pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;
pub mod websocket;

// Re-exports for convenience
pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config};

pub use websocket::WebSocketConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 4960);
        assert_eq!(config.server.chat_backlog_limit, 50);
        assert_eq!(config.server.history_limit, 10);
        assert!(config.server.motd.is_some());

        assert_eq!(config.security.cors_origins, "*");
        assert!(config.security.guest_logins);

        assert_eq!(config.websocket.queue_capacity, 64);
        assert_eq!(config.websocket.max_message_size, 16 * 1024);

        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filename, "server.log");
        assert_eq!(config.logging.rotation, "daily");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(
            config.server.chat_backlog_limit,
            deserialized.server.chat_backlog_limit
        );
        assert_eq!(
            config.websocket.queue_capacity,
            deserialized.websocket.queue_capacity
        );
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_accepts_aliases() {
        let level: LogLevel = serde_json::from_str("\"WARNING\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        let level: LogLevel = serde_json::from_str("\"err\"").unwrap();
        assert_eq!(level, LogLevel::Error);
        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
    }
}
