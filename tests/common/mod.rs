//! Helpers shared by the integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use table_fish_server::protocol::{ServerMessage, TableId, UserId};
use table_fish_server::server::{
    GameHooks, LobbyServer, NameGenerator, ServerConfig, Session,
};
use table_fish_server::storage::{InMemoryStore, UserRecord, UserStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Game(UserId, TableId),
    Replay(UserId, TableId),
}

/// Records rejoin invocations so tests can assert what the resolver did.
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<HookEvent>>,
}

impl RecordingHooks {
    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameHooks for RecordingHooks {
    async fn rejoin_game(&self, session: &Arc<Session>, table_id: TableId) {
        self.events
            .lock()
            .unwrap()
            .push(HookEvent::Game(session.user_id(), table_id));
    }

    async fn rejoin_replay(&self, session: &Arc<Session>, table_id: TableId) {
        self.events
            .lock()
            .unwrap()
            .push(HookEvent::Replay(session.user_id(), table_id));
    }
}

/// Deterministic display names keep message-order assertions stable.
pub struct FixedNames;

#[async_trait]
impl NameGenerator for FixedNames {
    async fn assign_display_name(&self, session: &Session) {
        session.send(ServerMessage::Name {
            name: "fixed-name-0".to_string(),
        });
    }
}

pub fn build_server() -> (Arc<LobbyServer>, Arc<InMemoryStore>, Arc<RecordingHooks>) {
    let store = Arc::new(InMemoryStore::new());
    let hooks = Arc::new(RecordingHooks::default());
    let server = LobbyServer::with_collaborators(
        ServerConfig::default(),
        Arc::clone(&store) as Arc<dyn UserStore>,
        Arc::clone(&hooks) as Arc<dyn GameHooks>,
        Arc::new(FixedNames),
    );
    (server, store, hooks)
}

pub fn make_session(user: UserRecord) -> (Arc<Session>, mpsc::Receiver<Arc<ServerMessage>>) {
    let (tx, rx) = mpsc::channel(64);
    let session = Arc::new(Session::new(user, tx, CancellationToken::new()));
    (session, rx)
}

pub fn collect_messages(
    mut rx: mpsc::Receiver<Arc<ServerMessage>>,
) -> Vec<Arc<ServerMessage>> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

/// Short tag for a message, used for sequence assertions.
pub fn kind(message: &ServerMessage) -> &'static str {
    match message {
        ServerMessage::Hello(_) => "hello",
        ServerMessage::Name { .. } => "name",
        ServerMessage::User { .. } => "user",
        ServerMessage::UserLeft { .. } => "user_left",
        ServerMessage::UserList(_) => "user_list",
        ServerMessage::TableList(_) => "table_list",
        ServerMessage::ChatList(_) => "chat_list",
        ServerMessage::Chat(_) => "chat",
        ServerMessage::GameHistory(_) => "history",
        ServerMessage::Error { .. } => "error",
        ServerMessage::Pong => "pong",
    }
}
