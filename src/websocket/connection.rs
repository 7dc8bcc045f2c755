use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::server::{LobbyServer, Session};
use crate::storage::UserRecord;

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<LobbyServer>, user: UserRecord) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(server.config().queue_capacity);
    let cancel = CancellationToken::new();
    let session = Arc::new(Session::new(user, tx, cancel.clone()));

    tracing::info!(
        user_id = session.user_id(),
        username = %session.username(),
        "websocket connection established"
    );

    // Writer task: drains the session's queue onto the socket. On a close
    // request (eviction) it flushes what is already queued, then sends a
    // Close frame; the supersession notice was enqueued before the request.
    let writer_cancel = cancel.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                // Bias the queue so already-enqueued messages (including a
                // terminal error notice) go out before a close is honored.
                biased;

                maybe = rx.recv() => {
                    let Some(message) = maybe else { break };
                    if send_text_message(&mut ws_sender, message.as_ref()).await.is_err() {
                        break;
                    }
                }
                () = writer_cancel.cancelled() => {
                    while let Ok(message) = rx.try_recv() {
                        if send_text_message(&mut ws_sender, message.as_ref()).await.is_err() {
                            break;
                        }
                    }
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Run the connect sequence before reading any inbound frame, so the
    // hello is the first thing the client ever receives. On a storage
    // failure the session stays registered and the client sees silence;
    // the connection itself is left open.
    if let Err(error) = server.handle_connect(Arc::clone(&session)).await {
        tracing::error!(
            username = %session.username(),
            error = %error,
            "connect sequence failed"
        );
    }

    let max_message_size = server.config().max_message_size;
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            frame = ws_receiver.next() => {
                let Some(frame) = frame else { break };
                let message = match frame {
                    Ok(message) => message,
                    Err(error) => {
                        tracing::warn!(username = %session.username(), "websocket error: {error}");
                        break;
                    }
                };

                match message {
                    Message::Text(text) => {
                        if text.len() > max_message_size {
                            tracing::warn!(
                                username = %session.username(),
                                size = text.len(),
                                max = max_message_size,
                                "inbound frame exceeds size limit"
                            );
                            session.error(format!(
                                "Message too large ({} bytes, max {} bytes)",
                                text.len(),
                                max_message_size
                            ));
                            continue;
                        }

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Ping) => {
                                session.send(ServerMessage::Pong);
                            }
                            Err(error) => {
                                tracing::warn!(
                                    username = %session.username(),
                                    error = %error,
                                    "rejected client frame"
                                );
                                session.error("Unrecognized message");
                            }
                        }
                    }
                    Message::Close(_) => {
                        tracing::info!(username = %session.username(), "websocket connection closed");
                        break;
                    }
                    // axum replies to protocol-level pings automatically.
                    _ => {}
                }
            }
        }
    }

    cancel.cancel();
    server.handle_disconnect(&session).await;
    let _ = send_task.await;
}

async fn send_text_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ()> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(error) => {
            tracing::error!("failed to serialize server message: {error}");
            return Ok(());
        }
    };

    if sender.send(Message::Text(json.into())).await.is_err() {
        tracing::debug!("failed to write frame, connection closed");
        return Err(());
    }

    Ok(())
}
