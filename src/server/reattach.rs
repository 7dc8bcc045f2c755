use std::sync::Arc;

use crate::protocol::TableId;

use super::connect::Reattachment;
use super::registry::LobbyState;
use super::session::Session;
use super::LobbyServer;

impl LobbyServer {
    /// Search for residual table membership of a connecting user and
    /// reinvoke the appropriate rejoin operation.
    ///
    /// Two-phase priority search, first match wins: live games before
    /// shared replays, because a user in both is reattached to the game
    /// only and the replay's disconnected-spectator entry is left alone.
    pub(crate) async fn resolve_reattachment(
        &self,
        state: &mut LobbyState,
        session: &Arc<Session>,
    ) -> Option<Reattachment> {
        // Phase 1: live games. Seats are matched by username, not by the
        // stored session handle; the handle is stale after a disconnect.
        let mut game_match: Option<TableId> = None;
        for (table_id, table) in state.tables.iter_mut() {
            if table.replay {
                continue;
            }
            if let Some(player) = table.find_player_mut(session.username()) {
                player.session = Some(Arc::clone(session));
                tracing::info!(
                    table = %table.name,
                    username = %session.username(),
                    "automatically reattending player"
                );
                game_match = Some(*table_id);
                break;
            }
        }
        if let Some(table_id) = game_match {
            self.hooks.rejoin_game(session, table_id).await;
            self.metrics.record_game_reattachment();
            return Some(Reattachment::Game(table_id));
        }

        // Phase 2: shared replays, by user id in the disconnected set.
        let mut replay_match: Option<TableId> = None;
        for (table_id, table) in state.tables.iter_mut() {
            if !table.replay {
                continue;
            }
            if table.discon_spectators.remove(&session.user_id()) {
                tracing::info!(
                    table = %table.name,
                    username = %session.username(),
                    "automatically re-spectating player"
                );
                replay_match = Some(*table_id);
                break;
            }
        }
        if let Some(table_id) = replay_match {
            // The spectator set is restored by the rejoin operation itself.
            self.hooks.rejoin_replay(session, table_id).await;
            self.metrics.record_replay_reattachment();
            return Some(Reattachment::Replay(table_id));
        }

        None
    }
}
