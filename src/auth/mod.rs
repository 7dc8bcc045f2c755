//! Connection handoff credentials.
//!
//! Authentication itself (passwords, identity providers) is owned by the
//! embedding application. Once it has verified a user, it mints a one-time
//! token here; the websocket route redeems the token to learn who is
//! connecting. Tokens are removed on first use, so a leaked URL cannot be
//! replayed.

use dashmap::DashMap;
use rand::{distr::Alphanumeric, RngExt};

use crate::storage::UserRecord;

/// Length of handoff tokens in characters (alphanumeric, ~190 bits).
const TOKEN_LEN: usize = 32;

/// In-memory map from outstanding handoff tokens to the authenticated user
/// they were minted for.
#[derive(Default)]
pub struct TokenStore {
    tokens: DashMap<String, UserRecord>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Mint a fresh one-time token for an authenticated user.
    pub fn issue(&self, user: UserRecord) -> String {
        let token = generate_token();
        tracing::debug!(user_id = user.id, username = %user.username, "issued handoff token");
        self.tokens.insert(token.clone(), user);
        token
    }

    /// Redeem a token, consuming it. Returns `None` for unknown or
    /// already-used tokens.
    pub fn redeem(&self, token: &str) -> Option<UserRecord> {
        self.tokens.remove(token).map(|(_, user)| user)
    }

    /// Number of outstanding (unredeemed) tokens.
    pub fn outstanding(&self) -> usize {
        self.tokens.len()
    }
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
