use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::auth::TokenStore;
use crate::config::defaults::{
    default_chat_backlog_limit, default_guest_logins, default_history_limit,
    default_max_message_size, default_motd, default_queue_capacity,
};
use crate::metrics::ServerMetrics;
use crate::protocol::{TableId, TableSummary, UserId};
use crate::storage::{create_store, StoreConfig, UserStore};

mod connect;
mod disconnect;
pub mod hooks;
mod reattach;
mod registry;
mod session;
mod snapshot;
mod tables;
#[cfg(test)]
mod test_support;

pub use connect::{ConnectError, ConnectOutcome, Reattachment};
pub use hooks::{GameHooks, NameGenerator, NullGameHooks, RandomNameGenerator};
pub use session::Session;
pub use tables::{Player, Table};

use registry::Lobby;

/// Runtime server configuration, assembled from the file config in main.rs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Lobby chat messages replayed at connect time.
    pub chat_backlog_limit: usize,
    /// Personal history entries sent at connect time.
    pub history_limit: usize,
    /// Server announcement sent after the chat backlog; `None` disables it.
    pub motd: Option<String>,
    /// Outbound message queue depth per connection.
    pub queue_capacity: usize,
    /// Maximum inbound text frame size in bytes.
    pub max_message_size: usize,
    /// Whether `/v1/login` may mint handoff tokens.
    pub guest_logins: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chat_backlog_limit: default_chat_backlog_limit(),
            history_limit: default_history_limit(),
            motd: default_motd(),
            queue_capacity: default_queue_capacity(),
            max_message_size: default_max_message_size(),
            guest_logins: default_guest_logins(),
        }
    }
}

/// The lobby server: owns the session and table registries and coordinates
/// every connection-lifecycle event against them.
///
/// All state-mutating entry points (`handle_connect`, `handle_disconnect`,
/// the table operations below) serialize on one internal lock; see
/// `registry::Lobby` for the locking discipline.
pub struct LobbyServer {
    lobby: Lobby,
    store: Arc<dyn UserStore>,
    hooks: Arc<dyn GameHooks>,
    names: Arc<dyn NameGenerator>,
    handoff_tokens: TokenStore,
    config: ServerConfig,
    metrics: Arc<ServerMetrics>,
    shutting_down: AtomicBool,
    instance_id: Uuid,
}

impl LobbyServer {
    /// Create a server with the built-in collaborators (in-memory store per
    /// `store_config`, no game engine wired, random display names).
    pub async fn new(config: ServerConfig, store_config: StoreConfig) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn UserStore> = Arc::from(create_store(store_config).await?);
        Ok(Self::with_collaborators(
            config,
            store,
            Arc::new(NullGameHooks),
            Arc::new(RandomNameGenerator),
        ))
    }

    /// Create a server with explicit collaborators. This is the constructor
    /// embedding applications (and tests) use to wire a real game engine.
    pub fn with_collaborators(
        config: ServerConfig,
        store: Arc<dyn UserStore>,
        hooks: Arc<dyn GameHooks>,
        names: Arc<dyn NameGenerator>,
    ) -> Arc<Self> {
        let instance_id = Uuid::new_v4();
        tracing::info!(%instance_id, "lobby server created");
        Arc::new(Self {
            lobby: Lobby::new(),
            store,
            hooks,
            names,
            handoff_tokens: TokenStore::new(),
            config,
            metrics: Arc::new(ServerMetrics::new()),
            shutting_down: AtomicBool::new(false),
            instance_id,
        })
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn handoff_tokens(&self) -> &TokenStore {
        &self.handoff_tokens
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Flip the graceful-shutdown flag surfaced in hello messages.
    pub fn set_shutting_down(&self, value: bool) {
        self.shutting_down.store(value, Ordering::Relaxed);
        tracing::info!(shutting_down = value, "shutdown flag changed");
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }

    // -- Composite registry operations -----------------------------------
    //
    // Each acquires the serialization lock for its whole body; callers
    // never see the raw registries.

    pub async fn session_count(&self) -> usize {
        self.lobby.lock().await.sessions.len()
    }

    pub async fn is_connected(&self, user_id: UserId) -> bool {
        self.lobby.lock().await.sessions.contains_key(&user_id)
    }

    /// The session currently registered for a user, if any. The returned
    /// handle is a snapshot; the registry may move on after the lock drops.
    pub async fn registered_session(&self, user_id: UserId) -> Option<Arc<Session>> {
        self.lobby.lock().await.sessions.get(&user_id).cloned()
    }

    /// Track a table created by the game engine.
    pub async fn register_table(&self, table: Table) -> TableId {
        let mut state = self.lobby.lock().await;
        let table_id = table.id;
        tracing::info!(%table_id, table = %table.name, replay = table.replay, "table registered");
        state.tables.insert(table_id, table);
        table_id
    }

    /// Drop a table the game engine has torn down.
    pub async fn remove_table(&self, table_id: TableId) -> bool {
        let removed = self.lobby.lock().await.tables.remove(&table_id);
        if let Some(table) = &removed {
            tracing::info!(%table_id, table = %table.name, "table removed");
        }
        removed.is_some()
    }

    /// Record that a user is spectating a table. Returns false if the table
    /// is unknown.
    pub async fn mark_spectating(&self, table_id: TableId, user_id: UserId) -> bool {
        let mut state = self.lobby.lock().await;
        match state.tables.get_mut(&table_id) {
            Some(table) => {
                table.spectators.insert(user_id);
                true
            }
            None => false,
        }
    }

    /// The session bound to a seat, if the seat exists and is bound.
    pub async fn player_session(
        &self,
        table_id: TableId,
        username: &str,
    ) -> Option<Arc<Session>> {
        let mut state = self.lobby.lock().await;
        state
            .tables
            .get_mut(&table_id)
            .and_then(|table| table.find_player_mut(username))
            .and_then(|player| player.session.clone())
    }

    pub async fn disconnected_spectators(&self, table_id: TableId) -> HashSet<UserId> {
        self.lobby
            .lock()
            .await
            .tables
            .get(&table_id)
            .map(|table| table.discon_spectators.clone())
            .unwrap_or_default()
    }

    /// Projection of every visible table, as the table list message sends it.
    pub async fn visible_tables(&self) -> Vec<TableSummary> {
        self.lobby
            .lock()
            .await
            .tables
            .values()
            .filter(|table| table.visible)
            .map(Table::summary)
            .collect()
    }
}
