use std::sync::Arc;

use crate::protocol::{
    ChatMessage, HelloPayload, ServerMessage, UserSettings, UserSummary, LOBBY_ROOM,
};
use crate::variants;

use super::connect::ConnectError;
use super::registry::LobbyState;
use super::session::Session;
use super::tables::Table;
use super::LobbyServer;

/// The initial state bundle delivered to a freshly registered session, and
/// the presence broadcast that tells everyone else about the arrival.
///
/// Delivery order matters and is guaranteed by the caller holding the
/// serialization lock: hello is always the first message a client receives,
/// and the presence broadcast happens only after the session is durably
/// registered.
impl LobbyServer {
    pub(crate) fn send_hello(
        &self,
        session: &Session,
        total_games: u64,
        settings: UserSettings,
    ) {
        session.send(ServerMessage::Hello(Box::new(HelloPayload {
            user_id: session.user_id(),
            username: session.username().to_string(),
            total_games,
            admin: session.admin(),
            muted: session.muted(),
            first_time_user: session.first_time_user(),
            settings,
            shutting_down: self.is_shutting_down(),
        })));
    }

    /// Announce the new arrival to every *other* live session. This is the
    /// only connect-time message about the connecting user that third
    /// parties receive.
    pub(crate) fn broadcast_presence(&self, state: &LobbyState, session: &Session) {
        let message = Arc::new(ServerMessage::User {
            user: session.summary(),
        });
        let dropped = state.broadcast_except(session.user_id(), &message);
        for _ in 0..dropped {
            self.metrics.record_message_dropped();
        }
    }

    /// One list message for all peers; the connecting user is excluded
    /// since the hello already conveyed their identity.
    pub(crate) fn send_user_list(&self, state: &LobbyState, session: &Session) {
        let users: Vec<UserSummary> = state
            .sessions
            .values()
            .filter(|other| other.user_id() != session.user_id())
            .map(|other| other.summary())
            .collect();
        session.send(ServerMessage::UserList(users));
    }

    pub(crate) fn send_table_list(&self, state: &LobbyState, session: &Session) {
        let tables: Vec<_> = state
            .tables
            .values()
            .filter(|table| table.visible)
            .map(Table::summary)
            .collect();
        session.send(ServerMessage::TableList(tables));
    }

    pub(crate) async fn send_chat_backlog(&self, session: &Session) {
        let backlog = self
            .store
            .chat_backlog(LOBBY_ROOM, self.config.chat_backlog_limit)
            .await;
        session.send(ServerMessage::ChatList(backlog));
    }

    pub(crate) fn send_announcement(&self, session: &Session) {
        if let Some(motd) = &self.config.motd {
            session.send(ServerMessage::Chat(ChatMessage::from_server(
                motd.clone(),
                LOBBY_ROOM,
            )));
        }
    }

    pub(crate) async fn send_history(&self, session: &Session) -> Result<(), ConnectError> {
        let user_id = session.user_id();
        let mut history = self
            .store
            .user_history(user_id, 0, self.config.history_limit, false)
            .await
            .map_err(|source| ConnectError::HistoryLookup { user_id, source })?;
        variants::fill_variant_names(&mut history);
        session.send(ServerMessage::GameHistory(history));
        Ok(())
    }
}
