use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::protocol::{TableId, TableSummary, UserId};

use super::session::Session;

/// A seat at a table: the username it belongs to plus the session currently
/// representing that user. The session handle goes stale on disconnect and
/// is rebound by the reattachment resolver, so membership checks always go
/// by username.
#[derive(Debug)]
pub struct Player {
    pub username: String,
    pub session: Option<Arc<Session>>,
}

impl Player {
    /// A seat with a live session attached.
    pub fn seated(username: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            username: username.into(),
            session: Some(session),
        }
    }

    /// A seat whose user is currently disconnected.
    pub fn detached(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            session: None,
        }
    }
}

/// An activity tracked by the lobby: a live game or a shared replay.
///
/// Table lifecycle is owned by the game engine; the lobby only rebinds
/// `Player.session` handles and maintains the spectator sets.
#[derive(Debug)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// Shared replay rather than a live game.
    pub replay: bool,
    /// Hidden tables are omitted from the table list.
    pub visible: bool,
    pub players: Vec<Player>,
    /// Users currently spectating.
    pub spectators: HashSet<UserId>,
    /// Replay spectators who lost their connection and are silently
    /// rejoined on reconnect. Unused for live games.
    pub discon_spectators: HashSet<UserId>,
}

impl Table {
    pub fn new_game(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn new_replay(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    fn new(name: impl Into<String>, replay: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            replay,
            visible: true,
            players: Vec::new(),
            spectators: HashSet::new(),
            discon_spectators: HashSet::new(),
        }
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Find the seat for a username. Matching is exact: seats are keyed by
    /// canonical usernames, which the storage layer already normalized.
    pub fn find_player_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.username == username)
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            table_id: self.id,
            name: self.name.clone(),
            replay: self.replay,
            player_names: self.players.iter().map(|p| p.username.clone()).collect(),
        }
    }
}
