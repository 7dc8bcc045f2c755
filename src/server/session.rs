use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::protocol::{ServerMessage, UserId, UserSummary};
use crate::storage::UserRecord;

/// The server-side representative of one authenticated user's single live
/// connection.
///
/// A session is created when the transport layer hands over an
/// authenticated connection, and is the value stored in the session
/// registry. Messages are enqueued onto the connection's writer task
/// through a bounded channel; a full or closed queue drops the message
/// (logged, never blocking the serialized command pipeline).
#[derive(Debug)]
pub struct Session {
    user: UserRecord,
    sender: mpsc::Sender<Arc<ServerMessage>>,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(
        user: UserRecord,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            user,
            sender,
            cancel,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// Canonical username (exact spelling the account was created with).
    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn admin(&self) -> bool {
        self.user.admin
    }

    pub fn muted(&self) -> bool {
        self.user.muted
    }

    pub fn first_time_user(&self) -> bool {
        self.user.first_time_user
    }

    pub fn user(&self) -> &UserRecord {
        &self.user
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user.id,
            username: self.user.username.clone(),
        }
    }

    /// Enqueue a message for delivery. Returns false if the message was
    /// dropped because the connection's queue is full or closed.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.send_arc(Arc::new(message))
    }

    pub fn send_arc(&self, message: Arc<ServerMessage>) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    user_id = self.user.id,
                    username = %self.user.username,
                    "outbound queue full; dropping message"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    user_id = self.user.id,
                    username = %self.user.username,
                    "connection gone; dropping message"
                );
                false
            }
        }
    }

    /// Send a human-readable error message to this session's client.
    pub fn error(&self, message: impl Into<String>) -> bool {
        self.send(ServerMessage::Error {
            message: message.into(),
        })
    }

    /// Ask the transport to close this connection. Returns false if the
    /// connection was already closed (or a close was already requested);
    /// non-fatal for callers, which log the outcome either way.
    pub fn close(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
