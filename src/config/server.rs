//! Server behavior configuration types.

use super::defaults::{default_chat_backlog_limit, default_history_limit, default_motd};
use serde::{Deserialize, Serialize};

/// Configuration for the lobby's connect-time snapshot.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Number of recent lobby chat messages sent to a connecting client
    #[serde(default = "default_chat_backlog_limit")]
    pub chat_backlog_limit: usize,
    /// Number of personal history entries sent to a connecting client
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Server announcement sent after the chat backlog; omit to disable
    #[serde(default = "default_motd")]
    pub motd: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chat_backlog_limit: default_chat_backlog_limit(),
            history_limit: default_history_limit(),
            motd: default_motd(),
        }
    }
}
