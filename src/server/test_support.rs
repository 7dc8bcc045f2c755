//! Shared fakes and helpers for the server module tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::protocol::{ChatMessage, GameHistoryEntry, ServerMessage, TableId, UserId};
use crate::storage::{InMemoryStore, UserRecord, UserStore};

use super::hooks::{GameHooks, NameGenerator};
use super::session::Session;
use super::{LobbyServer, ServerConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HookEvent {
    Game(UserId, TableId),
    Replay(UserId, TableId),
}

/// Records every rejoin invocation so tests can assert ordering and counts.
#[derive(Default)]
pub(crate) struct RecordingHooks {
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

/// Deterministic name generator so message-order assertions stay stable.
pub(crate) struct FixedNames;

#[async_trait]
impl NameGenerator for FixedNames {
    async fn assign_display_name(&self, session: &Session) {
        session.send(ServerMessage::Name {
            name: "test-name".to_string(),
        });
    }
}

/// Store fake whose individual lookups can be made to fail.
#[derive(Default)]
pub(crate) struct FailingStore {
    fail_stats: bool,
    fail_settings: bool,
    fail_history: bool,
}

impl FailingStore {
    pub fn failing_stats() -> Self {
        Self {
            fail_stats: true,
            ..Self::default()
        }
    }

    pub fn failing_settings() -> Self {
        Self {
            fail_settings: true,
            ..Self::default()
        }
    }

    pub fn failing_history() -> Self {
        Self {
            fail_history: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl UserStore for FailingStore {
    async fn ensure_user(&self, username: &str) -> anyhow::Result<UserRecord> {
        Ok(UserRecord::new(7, username))
    }

    async fn user_total_games(&self, _user_id: UserId) -> anyhow::Result<u64> {
        if self.fail_stats {
            anyhow::bail!("stats backend unavailable");
        }
        Ok(0)
    }

    async fn user_settings(&self, _user_id: UserId) -> anyhow::Result<serde_json::Value> {
        if self.fail_settings {
            anyhow::bail!("settings backend unavailable");
        }
        Ok(serde_json::json!({}))
    }

    async fn chat_backlog(&self, _room: &str, _limit: usize) -> Vec<ChatMessage> {
        Vec::new()
    }

    async fn user_history(
        &self,
        _user_id: UserId,
        _offset: usize,
        _limit: usize,
        _want_variant_detail: bool,
    ) -> anyhow::Result<Vec<GameHistoryEntry>> {
        if self.fail_history {
            anyhow::bail!("history backend unavailable");
        }
        Ok(Vec::new())
    }

    fn as_any(&self) -> &(dyn std::any::Any + Send + Sync) {
        self
    }
}

/// A server wired with an in-memory store, recording hooks, and fixed names.
pub(crate) async fn test_server() -> (Arc<LobbyServer>, Arc<InMemoryStore>, Arc<RecordingHooks>) {
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

/// A session with its message queue, ready to hand to `handle_connect`.
pub(crate) fn make_session(
    user: UserRecord,
) -> (Arc<Session>, mpsc::Receiver<Arc<ServerMessage>>) {
    let (tx, rx) = mpsc::channel(64);
    let session = Arc::new(Session::new(user, tx, CancellationToken::new()));
    (session, rx)
}

/// Drain everything currently enqueued for a session.
pub(crate) fn collect_messages(
    mut rx: mpsc::Receiver<Arc<ServerMessage>>,
) -> Vec<Arc<ServerMessage>> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}
