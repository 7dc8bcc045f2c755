//! Default value functions referenced by `#[serde(default = "…")]`.

use super::logging::LogFormat;

pub fn default_port() -> u16 {
    4960
}

// -- server --------------------------------------------------------------

/// Number of recent lobby chat messages replayed to a connecting client.
pub fn default_chat_backlog_limit() -> usize {
    50
}

/// Number of history entries sent at connect time. Kept small to avoid
/// wasted bandwidth; the client pages the rest on demand.
pub fn default_history_limit() -> usize {
    10
}

pub fn default_motd() -> Option<String> {
    Some("Welcome! Find teammates and discuss strategy in the lobby chat.".to_string())
}

// -- security ------------------------------------------------------------

pub fn default_cors_origins() -> String {
    "*".to_string()
}

/// Guest logins let the standalone binary mint its own handoff tokens.
/// Production deployments embed the server and disable this.
pub fn default_guest_logins() -> bool {
    true
}

// -- websocket -----------------------------------------------------------

/// Outbound message queue depth per connection. The connect snapshot alone
/// is seven messages, so keep comfortable headroom.
pub fn default_queue_capacity() -> usize {
    64
}

pub fn default_max_message_size() -> usize {
    16 * 1024
}

// -- logging -------------------------------------------------------------

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub fn default_enable_file_logging() -> bool {
    false
}

pub fn default_log_format() -> LogFormat {
    LogFormat::Text
}
