use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::protocol::{ServerMessage, TableId, UserId};

use super::session::Session;
use super::tables::Table;

/// The guarded container for all shared lobby state.
///
/// One mutex serializes every connect, disconnect, and registry mutation in
/// the process. The guard is held for the *full duration* of each composite
/// operation, including the bounded storage lookups a connect performs, so
/// no other actor can ever observe a half-evicted session, a user
/// registered twice, or a player list mid-rewrite. The raw maps never leave
/// this module's visibility; callers go through the composite operations on
/// [`LobbyServer`](crate::server::LobbyServer).
pub(crate) struct Lobby {
    state: Mutex<LobbyState>,
}

impl Lobby {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LobbyState::new()),
        }
    }

    /// Acquire the global serialization lock.
    pub async fn lock(&self) -> MutexGuard<'_, LobbyState> {
        self.state.lock().await
    }
}

/// Session registry + table registry. Only ever touched under the
/// [`Lobby`] lock.
pub(crate) struct LobbyState {
    /// At most one session per user id, by construction of the connect path.
    pub sessions: HashMap<UserId, Arc<Session>>,
    pub tables: HashMap<TableId, Table>,
}

impl LobbyState {
    fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            tables: HashMap::new(),
        }
    }

    /// Deliver a message to every session except `except`. Returns how many
    /// deliveries were dropped on full/closed queues.
    pub fn broadcast_except(&self, except: UserId, message: &Arc<ServerMessage>) -> usize {
        let mut dropped = 0;
        for session in self.sessions.values() {
            if session.user_id() == except {
                continue;
            }
            if !session.send_arc(Arc::clone(message)) {
                dropped += 1;
            }
        }
        dropped
    }
}
