//! End-to-end tests over real sockets: axum server on an ephemeral port,
//! tokio-tungstenite clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use table_fish_server::protocol::ServerMessage;
use table_fish_server::server::{LobbyServer, ServerConfig};
use table_fish_server::storage::{StoreConfig, UserStore};
use table_fish_server::websocket;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> (Arc<LobbyServer>, SocketAddr) {
    let server = LobbyServer::new(ServerConfig::default(), StoreConfig::InMemory)
        .await
        .expect("server should build");

    let app = websocket::create_router("*").with_state(Arc::clone(&server));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server failed: {e}");
        }
    });

    (server, addr)
}

async fn connect_as(server: &LobbyServer, addr: SocketAddr, username: &str) -> WsClient {
    let user = server.store().ensure_user(username).await.unwrap();
    let token = server.handoff_tokens().issue(user);
    let url = format!("ws://{addr}/v1/ws?token={token}");
    let (stream, _) = timeout(WAIT, connect_async(&url))
        .await
        .expect("connect timed out")
        .expect("websocket handshake failed");
    stream
}

async fn next_server_message(client: &mut WsClient) -> Option<ServerMessage> {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for frame")?;
        match frame.expect("websocket read failed") {
            WsMessage::Text(text) => {
                return Some(serde_json::from_str(&text).expect("unparseable server message"));
            }
            WsMessage::Close(_) => return None,
            _ => {}
        }
    }
}

/// Read server messages until the end of the connect snapshot (the history
/// message), returning everything seen.
async fn read_snapshot(client: &mut WsClient) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    loop {
        let message = next_server_message(client)
            .await
            .expect("connection closed mid-snapshot");
        let done = matches!(message, ServerMessage::GameHistory(_));
        messages.push(message);
        if done {
            return messages;
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hello_is_the_first_message_on_the_wire() {
    let (server, addr) = start_server().await;
    let mut client = connect_as(&server, addr, "alice").await;

    let first = next_server_message(&mut client)
        .await
        .expect("expected a message");
    let ServerMessage::Hello(hello) = first else {
        panic!("first frame must be the hello, got {first:?}");
    };
    assert_eq!(hello.username, "alice");

    let rest = read_snapshot(&mut client).await;
    assert!(rest
        .iter()
        .any(|m| matches!(m, ServerMessage::GameHistory(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicate_login_evicts_the_old_socket() {
    let (server, addr) = start_server().await;

    let mut first = connect_as(&server, addr, "alice").await;
    let _ = next_server_message(&mut first).await; // hello
    let _ = read_snapshot(&mut first).await;

    let mut second = connect_as(&server, addr, "alice").await;
    let ServerMessage::Hello(_) = next_server_message(&mut second).await.unwrap() else {
        panic!("second connection must receive its own hello");
    };

    // The first socket receives the terminal notice and is then closed.
    let mut saw_notice = false;
    while let Some(message) = next_server_message(&mut first).await {
        if let ServerMessage::Error { message } = message {
            assert!(message.contains("logged on from somewhere else"));
            saw_notice = true;
            break;
        }
    }
    assert!(saw_notice, "old socket never got the supersession notice");

    assert_eq!(server.session_count().await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_handoff_token_is_rejected() {
    let (_server, addr) = start_server().await;

    let url = format!("ws://{addr}/v1/ws?token=bogus");
    let result = timeout(WAIT, connect_async(&url)).await.unwrap();
    assert!(result.is_err(), "handshake must fail without a valid token");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_pong_round_trip() {
    let (server, addr) = start_server().await;
    let mut client = connect_as(&server, addr, "alice").await;
    let _ = next_server_message(&mut client).await; // hello
    let _ = read_snapshot(&mut client).await;

    client
        .send(WsMessage::Text(r#"{"type":"Ping"}"#.into()))
        .await
        .unwrap();

    let reply = next_server_message(&mut client).await.unwrap();
    assert!(matches!(reply, ServerMessage::Pong));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_guest_login_issues_a_usable_token() {
    let (_server, addr) = start_server().await;

    // Plain HTTP against the login route.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /v1/login?username=carol HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    let body = response
        .split("\r\n\r\n")
        .nth(1)
        .expect("response should have a body");
    let payload: serde_json::Value = serde_json::from_str(body.trim()).unwrap();
    let token = payload["token"].as_str().unwrap();
    assert_eq!(payload["username"], "carol");

    // The token works for a websocket upgrade.
    let url = format!("ws://{addr}/v1/ws?token={token}");
    let (mut client, _) = timeout(WAIT, connect_async(&url)).await.unwrap().unwrap();
    let first = next_server_message(&mut client).await.unwrap();
    assert!(matches!(first, ServerMessage::Hello(_)));
}
