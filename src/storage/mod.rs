use crate::protocol::{ChatMessage, GameHistoryEntry, UserId, UserSettings};
use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Cap on retained chat messages per room in the in-memory backend.
const MAX_CHAT_LOG: usize = 500;

/// Account record handed to the connection layer once authentication has
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub admin: bool,
    pub muted: bool,
    pub first_time_user: bool,
}

impl UserRecord {
    /// A plain account with default capability flags.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            admin: false,
            muted: false,
            first_time_user: true,
        }
    }
}

/// Storage abstraction consumed by the connection-lifecycle coordinator.
///
/// Account persistence itself is owned by the embedding application; the
/// lobby server only needs the lookups below.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username, creating the account on first sight.
    /// Lookup is case-insensitive; the returned record carries the
    /// canonical spelling.
    async fn ensure_user(&self, username: &str) -> Result<UserRecord>;

    /// Lifetime number of games the user has finished.
    async fn user_total_games(&self, user_id: UserId) -> Result<u64>;

    /// The user's opaque client settings blob.
    async fn user_settings(&self, user_id: UserId) -> Result<UserSettings>;

    /// The most recent `limit` messages for `room`, oldest first.
    /// Delivery-only: a backend that cannot serve the backlog returns an
    /// empty list rather than an error.
    async fn chat_backlog(&self, room: &str, limit: usize) -> Vec<ChatMessage>;

    /// A page of the user's game history, most recent first. When
    /// `want_variant_detail` is set the backend resolves variant names
    /// itself; otherwise callers enrich before delivery.
    async fn user_history(
        &self,
        user_id: UserId,
        offset: usize,
        limit: usize,
        want_variant_detail: bool,
    ) -> Result<Vec<GameHistoryEntry>>;

    /// Downcast helper to access backend-specific implementations
    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

/// Store configuration; in-memory only for table-fish-server.
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    #[default]
    InMemory,
}

/// Create a store instance based on configuration
pub async fn create_store(config: StoreConfig) -> Result<Box<dyn UserStore>> {
    match config {
        StoreConfig::InMemory => Ok(Box::new(InMemoryStore::new())),
    }
}

#[derive(Debug, Clone)]
struct UserEntry {
    record: UserRecord,
    settings: UserSettings,
    total_games: u64,
    /// Most recent first.
    history: Vec<GameHistoryEntry>,
}

/// Simple in-memory store for testing and single-instance deployments
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, UserEntry>>,
    /// Maps lowercased username -> user id for case-insensitive lookup.
    usernames: RwLock<HashMap<String, UserId>>,
    chat: RwLock<HashMap<String, VecDeque<ChatMessage>>>,
    next_user_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            usernames: RwLock::new(HashMap::new()),
            chat: RwLock::new(HashMap::new()),
            next_user_id: AtomicI64::new(1),
        }
    }

    /// Insert a fully specified account (test/seed helper). Overwrites any
    /// existing entry with the same id.
    pub async fn seed_user(&self, record: UserRecord, settings: UserSettings) {
        let mut usernames = self.usernames.write().await;
        let mut users = self.users.write().await;
        usernames.insert(record.username.to_lowercase(), record.id);
        users.insert(
            record.id,
            UserEntry {
                record,
                settings,
                total_games: 0,
                history: Vec::new(),
            },
        );
    }

    /// Append a chat message to its room's bounded log.
    pub async fn record_chat(&self, message: ChatMessage) {
        let mut chat = self.chat.write().await;
        let log = chat.entry(message.room.clone()).or_default();
        log.push_back(message);
        while log.len() > MAX_CHAT_LOG {
            log.pop_front();
        }
    }

    /// Record a finished game for a user: bumps their total and prepends
    /// the entry to their history.
    pub async fn record_game(&self, user_id: UserId, entry: GameHistoryEntry) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| anyhow::anyhow!("unknown user id {user_id}"))?;
        user.total_games += 1;
        user.history.insert(0, entry);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn ensure_user(&self, username: &str) -> Result<UserRecord> {
        let key = username.to_lowercase();

        if let Some(id) = self.usernames.read().await.get(&key) {
            let users = self.users.read().await;
            let entry = users
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("username index points at missing user {id}"))?;
            return Ok(entry.record.clone());
        }

        // Lock ordering: usernames first, then users (consistent with
        // seed_user). Re-check under the write lock to close the race
        // between two first-time logins with the same name.
        let mut usernames = self.usernames.write().await;
        let mut users = self.users.write().await;
        if let Some(id) = usernames.get(&key) {
            let entry = users
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("username index points at missing user {id}"))?;
            return Ok(entry.record.clone());
        }

        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
        let record = UserRecord::new(id, username);
        usernames.insert(key, id);
        users.insert(
            id,
            UserEntry {
                record: record.clone(),
                settings: serde_json::json!({}),
                total_games: 0,
                history: Vec::new(),
            },
        );
        tracing::info!(user_id = id, username, "created user account");
        Ok(record)
    }

    async fn user_total_games(&self, user_id: UserId) -> Result<u64> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|entry| entry.total_games)
            .ok_or_else(|| anyhow::anyhow!("unknown user id {user_id}"))
    }

    async fn user_settings(&self, user_id: UserId) -> Result<UserSettings> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|entry| entry.settings.clone())
            .ok_or_else(|| anyhow::anyhow!("unknown user id {user_id}"))
    }

    async fn chat_backlog(&self, room: &str, limit: usize) -> Vec<ChatMessage> {
        let chat = self.chat.read().await;
        let Some(log) = chat.get(room) else {
            return Vec::new();
        };
        let skip = log.len().saturating_sub(limit);
        log.iter().skip(skip).cloned().collect()
    }

    async fn user_history(
        &self,
        user_id: UserId,
        offset: usize,
        limit: usize,
        want_variant_detail: bool,
    ) -> Result<Vec<GameHistoryEntry>> {
        let users = self.users.read().await;
        let entry = users
            .get(&user_id)
            .ok_or_else(|| anyhow::anyhow!("unknown user id {user_id}"))?;

        let mut page: Vec<GameHistoryEntry> = entry
            .history
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        if want_variant_detail {
            crate::variants::fill_variant_names(&mut page);
        }
        Ok(page)
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}
