#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools
)]

//! # Table Fish Server
//!
//! A lightweight, in-memory WebSocket lobby server for turn-based tabletop
//! games: one authoritative connection per user, automatic reattachment to
//! games and shared replays, and a consistent connect-time snapshot.
//!
//! Zero external services: no database, no cloud dependencies. Run the
//! binary and connect via WebSocket.

/// Connection handoff tokens (post-authentication)
pub mod auth;

/// Server configuration and environment variables
pub mod config;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// WebSocket message protocol definitions
pub mod protocol;

/// Lobby orchestration: registries, connect/disconnect, reattachment
pub mod server;

/// Storage abstraction layer (in-memory implementation)
pub mod storage;

/// Built-in game variant table
pub mod variants;

/// WebSocket connection handling
pub mod websocket;
