use std::sync::Arc;

use async_trait::async_trait;
use rand::RngExt;

use crate::protocol::{ServerMessage, TableId};

use super::session::Session;

/// Game-engine operations the connection-lifecycle coordinator invokes but
/// does not own.
///
/// # Contract
///
/// Both rejoin operations are idempotent with respect to the user's current
/// status: they are safe to call regardless of what bookkeeping state the
/// user was previously in, and are callable from the automatic reattachment
/// path as well as an explicit user command path.
///
/// Implementations run with the lobby serialization lock held and must not
/// call back into lobby operations; they should be bounded, synchronous
/// work (sending state to the session, updating engine-owned bookkeeping).
#[async_trait]
pub trait GameHooks: Send + Sync {
    /// Attach `session` as the live representative for that user's existing
    /// seat in the given table.
    async fn rejoin_game(&self, session: &Arc<Session>, table_id: TableId);

    /// Attach `session` as a spectator of the given shared replay.
    async fn rejoin_replay(&self, session: &Arc<Session>, table_id: TableId);
}

/// Hook implementation for deployments that wire the game engine elsewhere:
/// records the rejoin in the log and does nothing else.
pub struct NullGameHooks;

#[async_trait]
impl GameHooks for NullGameHooks {
    async fn rejoin_game(&self, session: &Arc<Session>, table_id: TableId) {
        tracing::debug!(username = %session.username(), %table_id, "rejoin_game (no engine wired)");
    }

    async fn rejoin_replay(&self, session: &Arc<Session>, table_id: TableId) {
        tracing::debug!(username = %session.username(), %table_id, "rejoin_replay (no engine wired)");
    }
}

/// Produces and applies a randomized display name for a session.
#[async_trait]
pub trait NameGenerator: Send + Sync {
    /// Assign a fresh randomized name; the side effect is a `Name` message
    /// delivered to the session.
    async fn assign_display_name(&self, session: &Session);
}

const NAME_ADJECTIVES: &[&str] = &[
    "amber", "brisk", "coral", "dapper", "eager", "foggy", "gilded", "humble", "ivory", "jolly",
    "keen", "lunar", "mellow", "noble", "opal", "plucky", "quiet", "rustic", "silver", "tidal",
];

const NAME_NOUNS: &[&str] = &[
    "anchor", "beacon", "current", "drift", "estuary", "fathom", "gull", "harbor", "inlet",
    "jetty", "kelp", "lagoon", "marlin", "nautilus", "otter", "pearl", "quay", "reef", "sandbar",
    "tide",
];

/// Default name generator: adjective-noun-number, e.g. `brisk-marlin-42`.
pub struct RandomNameGenerator;

impl RandomNameGenerator {
    fn generate() -> String {
        let mut rng = rand::rng();
        let adjective = NAME_ADJECTIVES[rng.random_range(0..NAME_ADJECTIVES.len())];
        let noun = NAME_NOUNS[rng.random_range(0..NAME_NOUNS.len())];
        let number: u8 = rng.random_range(0..100);
        format!("{adjective}-{noun}-{number}")
    }
}

#[async_trait]
impl NameGenerator for RandomNameGenerator {
    async fn assign_display_name(&self, session: &Session) {
        let name = Self::generate();
        tracing::debug!(username = %session.username(), display_name = %name, "assigned display name");
        session.send(ServerMessage::Name { name });
    }
}
