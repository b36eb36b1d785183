//! Shared scaffolding for end-to-end tests: spins up a real server bound to
//! an ephemeral port, backed by the in-memory document store, and exposes
//! both an HTTP base URL and a WebSocket connect helper.

#![allow(dead_code)]

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tabletop_tavern_core::config::Config;
use tabletop_tavern_core::server::AppContext;
use tabletop_tavern_core::store::memory::InMemoryRoomStore;
use tabletop_tavern_core::websocket;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    addr: std::net::SocketAddr,
    pub ctx: AppContext,
}

impl TestServer {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self, room: &str, player: &str) -> String {
        format!("ws://{}/ws/{room}?player_name={player}", self.addr)
    }

    pub async fn connect(&self, room: &str, player: &str) -> WsStream {
        let (stream, _response) = tokio_tungstenite::connect_async(self.ws_url(room, player))
            .await
            .expect("websocket connect failed");
        stream
    }
}

/// Starts a server with default configuration. Most tests that don't care
/// about the follow-up delay or reconnect grace should use this.
pub async fn spawn_app() -> TestServer {
    spawn_app_with_config(Config::default()).await
}

/// Starts a server with a caller-supplied configuration, useful for
/// shrinking `dispatch_follow_up_delay_ms` or `reconnect_grace_secs` so
/// tests don't have to wait on production-sized timers.
pub async fn spawn_app_with_config(config: Config) -> TestServer {
    let store = Arc::new(InMemoryRoomStore::new());
    let ctx = AppContext::new(store, Arc::new(config));
    let app = websocket::routes::create_router("*").with_state(ctx.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server crashed");
    });

    TestServer { addr, ctx }
}

/// A server with tiny timers: the `dice_roll` follow-up delay and the
/// reconnect grace window are both shrunk so reconnect/prompt-clear tests
/// run in milliseconds instead of the production defaults.
pub async fn spawn_app_fast_timers() -> TestServer {
    let mut config = Config::default();
    config.server.dispatch_follow_up_delay_ms = 10;
    config.server.reconnect_grace_secs = 0;
    spawn_app_with_config(config).await
}

pub async fn send_event(ws: &mut WsStream, event_type: &str, data: Value) {
    let frame = serde_json::json!({ "event_type": event_type, "data": data });
    ws.send(Message::Text(frame.to_string().into()))
        .await
        .expect("failed to send websocket frame");
}

/// Reads the next text frame and parses it as JSON, skipping any
/// non-text control frames (ping/pong) in between.
pub async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let message = ws
            .next()
            .await
            .expect("websocket stream ended unexpectedly")
            .expect("websocket read error");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("frame was not valid JSON");
        }
    }
}

/// Like [`recv_json`] but keeps reading until a frame's `event_type`
/// matches `want`, ignoring anything else (e.g. a `lobby_update` that
/// interleaves with the event under test).
pub async fn recv_event(ws: &mut WsStream, want: &str) -> Value {
    loop {
        let frame = recv_json(ws).await;
        if frame.get("event_type").and_then(Value::as_str) == Some(want) {
            return frame;
        }
    }
}
