use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::MetricsSnapshot;
use crate::protocol::UserId;
use crate::server::LobbyServer;

use super::connection;

/// Create the Axum router with WebSocket support
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<LobbyServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    // Parse CORS origins
    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/v1/ws", get(websocket_handler))
        .route("/v1/login", post(login_handler))
        .route("/v1/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Deserialize)]
struct ConnectParams {
    /// One-time handoff token minted after authentication.
    token: String,
}

/// Upgrade to a websocket once the handoff token resolves. Authentication
/// itself already happened (this is the third step of logging in); an
/// unknown or reused token means no upgrade at all.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(server): State<Arc<LobbyServer>>,
) -> Response {
    let Some(user) = server.handoff_tokens().redeem(&params.token) else {
        tracing::warn!("websocket upgrade rejected: unknown or already-used handoff token");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    ws.on_upgrade(move |socket| connection::handle_socket(socket, server, user))
}

#[derive(Deserialize)]
struct LoginParams {
    username: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user_id: UserId,
    username: String,
}

/// Development login: mints a handoff token for a username without any
/// credential check. Gated by `security.guest_logins`; embedding
/// applications disable it and mint tokens through `TokenStore` directly.
async fn login_handler(
    State(server): State<Arc<LobbyServer>>,
    Query(params): Query<LoginParams>,
) -> Response {
    if !server.config().guest_logins {
        return StatusCode::FORBIDDEN.into_response();
    }

    let username = params.username.trim();
    if username.is_empty() || username.len() > 32 {
        return (
            StatusCode::BAD_REQUEST,
            "username must be between 1 and 32 characters",
        )
            .into_response();
    }

    match server.store().ensure_user(username).await {
        Ok(user) => {
            let token = server.handoff_tokens().issue(user.clone());
            Json(LoginResponse {
                token,
                user_id: user.id,
                username: user.username,
            })
            .into_response()
        }
        Err(error) => {
            tracing::error!(username, error = %error, "guest login failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct MetricsResponse {
    instance_id: Uuid,
    shutting_down: bool,
    connected_sessions: usize,
    #[serde(flatten)]
    counters: MetricsSnapshot,
}

async fn metrics_handler(State(server): State<Arc<LobbyServer>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        instance_id: server.instance_id(),
        shutting_down: server.is_shutting_down(),
        connected_sessions: server.session_count().await,
        counters: server.metrics().snapshot(),
    })
}
