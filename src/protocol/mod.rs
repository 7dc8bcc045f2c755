//! Logical message protocol between the lobby server and its clients.
//!
//! Messages are serialized as JSON text frames by the websocket layer; the
//! enums here are the transport-agnostic shapes.

pub mod messages;
pub mod types;

pub use messages::{ClientMessage, ServerMessage};
pub use types::{
    ChatMessage, GameHistoryEntry, HelloPayload, TableId, TableSummary, UserId, UserSettings,
    UserSummary, LOBBY_ROOM,
};
