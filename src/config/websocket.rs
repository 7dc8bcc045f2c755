//! WebSocket connection settings.

use super::defaults::{default_max_message_size, default_queue_capacity};
use serde::{Deserialize, Serialize};

/// Per-connection websocket tuning.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebSocketConfig {
    /// Outbound message queue depth per connection
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum inbound text frame size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl WebSocketConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queue_capacity == 0 {
            anyhow::bail!("websocket.queue_capacity must be at least 1");
        }
        if self.max_message_size < 256 {
            anyhow::bail!(
                "websocket.max_message_size must be at least 256 bytes (got {})",
                self.max_message_size
            );
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_message_size: default_max_message_size(),
        }
    }
}
