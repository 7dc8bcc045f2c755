use std::sync::Arc;

use crate::protocol::ServerMessage;

use super::registry::LobbyState;
use super::session::Session;
use super::LobbyServer;

impl LobbyServer {
    /// Handle a transport-close event for a session.
    ///
    /// Serialized against connects through the lobby lock. Safe to call for
    /// a session that was already evicted by a newer connection; the
    /// cleanup below detects that and does nothing.
    pub async fn handle_disconnect(&self, session: &Arc<Session>) {
        let mut state = self.lobby.lock().await;
        if self.cleanup_session(&mut state, session) {
            self.metrics.record_disconnection();
        }
    }

    /// Remove a session's registration and detach its table memberships.
    ///
    /// Idempotent by construction, because it is invoked from two places
    /// that can race in time (never in execution, as both run under the
    /// lock): synchronously by the eviction step of a connect, and later by
    /// the transport-close event of the evicted socket. Every mutation is
    /// check-and-clear:
    /// - the registry entry is removed only if it still points at *this*
    ///   session (a newer session for the same user may own the slot now);
    /// - a seat's handle is cleared only if it is still *this* session;
    /// - a replay spectator is moved to the disconnected set only if they
    ///   were still in the live set.
    ///
    /// Returns true if this call removed the session's registration.
    pub(crate) fn cleanup_session(&self, state: &mut LobbyState, session: &Arc<Session>) -> bool {
        let user_id = session.user_id();

        let registered = state
            .sessions
            .get(&user_id)
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if registered {
            state.sessions.remove(&user_id);
            let notice = Arc::new(ServerMessage::UserLeft { user_id });
            let dropped = state.broadcast_except(user_id, &notice);
            for _ in 0..dropped {
                self.metrics.record_message_dropped();
            }
            tracing::info!(
                user_id,
                username = %session.username(),
                connected = state.sessions.len(),
                "user disconnected"
            );
        } else {
            tracing::debug!(
                user_id,
                username = %session.username(),
                "cleanup skipped; session is no longer the registered one"
            );
        }

        for table in state.tables.values_mut() {
            if !table.replay {
                if let Some(player) = table.find_player_mut(session.username()) {
                    if player
                        .session
                        .as_ref()
                        .is_some_and(|bound| Arc::ptr_eq(bound, session))
                    {
                        player.session = None;
                    }
                }
            }
            if table.spectators.remove(&user_id) && table.replay {
                table.discon_spectators.insert(user_id);
                tracing::info!(
                    table = %table.name,
                    username = %session.username(),
                    "spectator disconnected from shared replay"
                );
            }
        }

        registered
    }
}
