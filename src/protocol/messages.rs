use serde::{Deserialize, Serialize};

use super::types::{
    ChatMessage, GameHistoryEntry, HelloPayload, TableSummary, UserId, UserSummary,
};

/// Message types sent from client to server.
///
/// The lobby server only speaks the connection-lifecycle protocol; game
/// commands are routed to the game engine by the embedding application and
/// are not part of this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// Heartbeat to maintain the connection.
    Ping,
}

/// Message types sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Identity confirmation; always the first message a newly connected
    /// client receives (boxed to reduce enum size).
    Hello(Box<HelloPayload>),
    /// A freshly generated random display name for the user.
    Name { name: String },
    /// Presence broadcast: another user connected.
    User { user: UserSummary },
    /// Another user's session went away.
    UserLeft { user_id: UserId },
    /// Every other currently connected user, sent once at connect time.
    /// (One list message is much cheaper than a `User` message per peer.)
    UserList(Vec<UserSummary>),
    /// Every visible table, sent once at connect time.
    TableList(Vec<TableSummary>),
    /// Bounded backlog of recent lobby chat.
    ChatList(Vec<ChatMessage>),
    /// A single chat message (server announcements use this too).
    Chat(ChatMessage),
    /// Bounded personal game history, variant metadata resolved.
    GameHistory(Vec<GameHistoryEntry>),
    /// Human-readable error, also used as the terminal notice sent to a
    /// session that is being superseded by a newer connection.
    Error { message: String },
    /// Pong response to ping.
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_server_message_uses_tagged_encoding() {
        let msg = ServerMessage::UserLeft { user_id: 7 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "UserLeft");
        assert_eq!(json["data"]["user_id"], 7);
    }

    #[test]
    fn test_chat_message_omits_author_for_server_messages() {
        let msg = ServerMessage::Chat(ChatMessage {
            msg: "welcome".to_string(),
            who: None,
            server: true,
            datetime: Utc::now(),
            room: "lobby".to_string(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("\"who\""));
    }

    #[test]
    fn test_client_message_round_trip() {
        let json = serde_json::to_string(&ClientMessage::Ping).unwrap();
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, ClientMessage::Ping));
    }
}
