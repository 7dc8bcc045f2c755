use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lobby chat room name used when no room is specified.
pub const LOBBY_ROOM: &str = "lobby";

/// Unique identifier for users (assigned by the account store)
pub type UserId = i64;
/// Unique identifier for tables (live games and shared replays)
pub type TableId = Uuid;

/// Opaque client settings blob, owned by the storage layer.
///
/// The server never interprets it; it is fetched at connect time and echoed
/// back in the hello message so clients can roam between machines.
pub type UserSettings = serde_json::Value;

/// Projection of a connected user, as sent in peer lists and presence
/// broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
}

/// Projection of a visible table, as sent in the table list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_id: TableId,
    pub name: String,
    pub replay: bool,
    pub player_names: Vec<String>,
}

/// A single chat message, either user-authored or server-authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub msg: String,
    /// Author username; absent for server-authored messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub who: Option<String>,
    pub server: bool,
    pub datetime: DateTime<Utc>,
    pub room: String,
}

impl ChatMessage {
    /// Builds a server-authored message for the given room, stamped now.
    pub fn from_server(msg: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            who: None,
            server: true,
            datetime: Utc::now(),
            room: room.into(),
        }
    }
}

/// One entry of a user's personal game history.
///
/// `variant_name` is resolved from the variant table just before delivery;
/// storage backends may leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    pub game_id: i64,
    pub num_players: u8,
    pub score: i32,
    pub variant_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Payload for the hello message.
/// Boxed in ServerMessage to reduce enum size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// The user's id, so the client knows who the server thinks it is.
    pub user_id: UserId,
    /// Canonical username. Clients may have logged in with the wrong case
    /// and need the exact spelling the server uses.
    pub username: String,
    /// Lifetime games played, shown in the client's history nav.
    pub total_games: u64,
    pub admin: bool,
    pub muted: bool,
    pub first_time_user: bool,
    pub settings: UserSettings,
    /// Whether the server is currently performing a graceful shutdown.
    pub shutting_down: bool,
}
