use std::sync::Arc;

use thiserror::Error;

use crate::protocol::{TableId, UserId};

use super::registry::LobbyState;
use super::session::Session;
use super::LobbyServer;

/// A storage lookup failed partway through the connect sequence.
///
/// The session *remains registered* in that case: the client has received
/// no hello (possibly no snapshot at all) and sees only silence. Operators
/// see the abort in the log and the `connect_aborts` metric.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to load total games for user {user_id}")]
    StatsLookup {
        user_id: UserId,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load settings for user {user_id}")]
    SettingsLookup {
        user_id: UserId,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load game history for user {user_id}")]
    HistoryLookup {
        user_id: UserId,
        #[source]
        source: anyhow::Error,
    },
}

/// What the reattachment resolver found for a connecting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reattachment {
    /// Rebound to their seat in a live game.
    Game(TableId),
    /// Rejoined a shared replay they were disconnected from.
    Replay(TableId),
}

/// Result of a completed connect sequence.
#[derive(Debug)]
pub struct ConnectOutcome {
    /// At most one reattachment happens per connect; a user in both a live
    /// game and a replay is reattached to the game only.
    pub reattached: Option<Reattachment>,
}

impl LobbyServer {
    /// Run the full connect sequence for a newly authenticated session.
    ///
    /// Invoked exactly once per transport session, after authentication has
    /// succeeded and before any command processing. The entire sequence
    /// runs under the lobby serialization lock, so it is atomic with
    /// respect to every other connect, disconnect, and registry mutation:
    ///
    /// 1. Evict any existing session for the same user (terminal notice,
    ///    transport close, synchronous cleanup).
    /// 2. Register the new session.
    /// 3. Fetch totals + settings; either failure aborts (see
    ///    [`ConnectError`]).
    /// 4. Deliver the snapshot: hello first, then display name, presence to
    ///    everyone else, peer list, table list, chat backlog, announcement,
    ///    personal history.
    /// 5. Reattach the user to a live game or shared replay they never
    ///    properly left.
    pub async fn handle_connect(
        &self,
        session: Arc<Session>,
    ) -> Result<ConnectOutcome, ConnectError> {
        let mut state = self.lobby.lock().await;
        let user_id = session.user_id();

        self.evict_existing(&mut state, &session);

        state.sessions.insert(user_id, Arc::clone(&session));
        self.metrics.record_connection();
        tracing::info!(
            user_id,
            username = %session.username(),
            connected = state.sessions.len(),
            "user connected"
        );

        let total_games = self
            .store
            .user_total_games(user_id)
            .await
            .map_err(|source| self.abort(ConnectError::StatsLookup { user_id, source }))?;
        let settings = self
            .store
            .user_settings(user_id)
            .await
            .map_err(|source| self.abort(ConnectError::SettingsLookup { user_id, source }))?;

        self.send_hello(&session, total_games, settings);
        self.names.assign_display_name(&session).await;

        // The session is durably registered at this point, so a concurrent
        // peer-list query can neither miss the new arrival nor count it twice.
        self.broadcast_presence(&state, &session);

        self.send_user_list(&state, &session);
        self.send_table_list(&state, &session);
        self.send_chat_backlog(&session).await;
        self.send_announcement(&session);
        self.send_history(&session)
            .await
            .map_err(|error| self.abort(error))?;

        let reattached = self.resolve_reattachment(&mut state, &session).await;

        Ok(ConnectOutcome { reattached })
    }

    /// Steps 1–2 of the connect sequence: supersede any live session the
    /// user already has.
    fn evict_existing(&self, state: &mut LobbyState, session: &Arc<Session>) {
        let Some(old) = state.sessions.get(&session.user_id()).cloned() else {
            return;
        };

        tracing::info!(
            username = %session.username(),
            "closing existing connection for user"
        );
        old.error("You have logged on from somewhere else, so you have been disconnected here.");
        if old.close() {
            tracing::info!("terminated superseded websocket connection");
        } else {
            // Non-fatal: the transport was already gone.
            tracing::info!("superseded websocket connection was already closed");
        }

        // The transport-close event for the old session fires on another
        // task; run the cleanup here, before registering the new session,
        // so the rest of this sequence never observes the evicted session's
        // memberships. The routine is idempotent against the close event
        // firing later.
        self.cleanup_session(state, &old);
        self.metrics.record_eviction();
    }

    fn abort(&self, error: ConnectError) -> ConnectError {
        self.metrics.record_connect_abort();
        tracing::error!(
            error = %error,
            "connect sequence aborted; session remains registered without a snapshot"
        );
        error
    }
}
