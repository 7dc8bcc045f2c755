use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the connection-lifecycle pipeline, served at `/v1/metrics`.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Connections accepted over the process lifetime.
    pub total_connections: AtomicU64,
    /// Sessions currently registered.
    pub active_sessions: AtomicU64,
    /// Transport disconnects processed.
    pub disconnections: AtomicU64,
    /// Stale sessions evicted by a newer connection for the same user.
    pub evictions: AtomicU64,
    /// Users automatically reattached to a live game.
    pub game_reattachments: AtomicU64,
    /// Users automatically reattached to a shared replay.
    pub replay_reattachments: AtomicU64,
    /// Connect sequences aborted by a storage lookup failure.
    pub connect_aborts: AtomicU64,
    /// Outbound messages dropped because a session's queue was full or closed.
    pub messages_dropped: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_connections: u64,
    pub active_sessions: u64,
    pub disconnections: u64,
    pub evictions: u64,
    pub game_reattachments: u64,
    pub replay_reattachments: u64,
    pub connect_aborts: u64,
    pub messages_dropped: u64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connection(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disconnection(&self) {
        self.disconnections.fetch_add(1, Ordering::Relaxed);
        // Saturating: an eviction already decremented for the same session.
        let _ = self
            .active_sessions
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .active_sessions
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    pub fn record_game_reattachment(&self) {
        self.game_reattachments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay_reattachment(&self) {
        self.replay_reattachments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connect_abort(&self) {
        self.connect_aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_sessions: self.active_sessions.load(Ordering::Relaxed),
            disconnections: self.disconnections.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            game_reattachments: self.game_reattachments.load(Ordering::Relaxed),
            replay_reattachments: self.replay_reattachments.load(Ordering::Relaxed),
            connect_aborts: self.connect_aborts.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lifecycle_counters() {
        let metrics = ServerMetrics::new();
        metrics.record_connection();
        metrics.record_connection();
        metrics.record_eviction();
        metrics.record_disconnection();

        let snap = metrics.snapshot();
        assert_eq!(snap.total_connections, 2);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.disconnections, 1);
        assert_eq!(snap.active_sessions, 0);
    }

    #[test]
    fn test_active_sessions_never_underflows() {
        let metrics = ServerMetrics::new();
        metrics.record_disconnection();
        assert_eq!(metrics.snapshot().active_sessions, 0);
    }
}
