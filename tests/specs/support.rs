// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec harness: a running broker plus WebSocket and HTTP clients.

use ctx_core::{PermissionLevel, TeamId};
use ctx_daemon::{serve, Config, Daemon};
use ctx_storage::{AgentSpec, Store};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A broker listening on an ephemeral port, torn down by [`Broker::stop`].
pub struct Broker {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    daemon: Daemon,
    stop: tokio::sync::oneshot::Sender<()>,
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    _dir: TempDir,
}

impl Broker {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut config = Config {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: dir.path().join("broker.db"),
            embedder: ctx_daemon::embed::EmbedderKind::Hash,
            embed_workers: 1,
            allowlist: ctx_daemon::Allowlist::default(),
        };
        configure(&mut config);

        let daemon = Daemon::bootstrap(&config).expect("bootstrap");
        let listener = tokio::net::TcpListener::bind(config.bind).await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let (stop, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let ctx = daemon.ctx.clone();
        let server = tokio::spawn(serve(listener, ctx, async move {
            let _ = stop_rx.await;
        }));

        Self { addr, db_path: config.db_path, daemon, stop, server, _dir: dir }
    }

    /// A fresh store handle on the broker's database, for seeding and
    /// assertions.
    pub fn store(&self) -> Store {
        Store::open(&self.db_path).expect("open store")
    }

    /// Open a WebSocket and wait for the registration broadcast (which
    /// also lands on the registering socket), so the caller knows the
    /// connection row and any auto-bind are in place.
    pub async fn connect(&self, connection_id: &str) -> (WsClient, Value) {
        let mut client = self.connect_raw(connection_id).await;
        let event = client.recv_json().await;
        (client, event)
    }

    pub async fn connect_raw(&self, connection_id: &str) -> WsClient {
        let url = format!("ws://{}/ws/{}", self.addr, connection_id);
        let (stream, _response) =
            tokio_tungstenite::connect_async(url).await.expect("ws connect");
        WsClient { stream }
    }

    pub async fn http_get(&self, path: &str) -> (u16, Value) {
        self.http_request("GET", path).await
    }

    pub async fn http_post(&self, path: &str) -> (u16, Value) {
        self.http_request("POST", path).await
    }

    pub async fn http_delete(&self, path: &str) -> (u16, Value) {
        self.http_request("DELETE", path).await
    }

    /// Minimal HTTP/1.1 client: one request, `Connection: close`, read to
    /// EOF, split the body at the header boundary.
    async fn http_request(&self, method: &str, path: &str) -> (u16, Value) {
        let mut stream = TcpStream::connect(self.addr).await.expect("http connect");
        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        stream.write_all(request.as_bytes()).await.expect("http write");

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.expect("http read");
        let text = String::from_utf8_lossy(&raw);

        let status: u16 = text
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let body = text
            .split_once("\r\n\r\n")
            .map(|(_, body)| body)
            .unwrap_or_default();
        let value = serde_json::from_str(body).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.server.await;
        self.daemon.shutdown().await;
    }
}

/// One WebSocket client. Responses and broadcasts share the socket; the
/// helpers below sort them apart by the broadcast `type` tag.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn send_json(&mut self, value: &Value) {
        self.stream
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("ws send");
    }

    /// Next JSON text frame, skipping pings.
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("ws recv timed out")
                .expect("socket closed")
                .expect("ws error");
            match frame {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str()).expect("json frame")
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Send one `{method, params}` request and return its reply, skipping
    /// any broadcast frames that arrive in between.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        self.send_json(&json!({"method": method, "params": params})).await;
        loop {
            let frame = self.recv_json().await;
            if frame.get("type").is_none() {
                return frame;
            }
        }
    }

    /// Wait for a broadcast frame of the given type, skipping others.
    pub async fn expect_event(&mut self, event_type: &str) -> Value {
        loop {
            let frame = self.recv_json().await;
            if frame.get("type").and_then(Value::as_str) == Some(event_type) {
                return frame;
            }
        }
    }

    /// True when the server closes the socket without another text frame.
    pub async fn closed_by_server(mut self) -> bool {
        loop {
            match tokio::time::timeout(RECV_TIMEOUT, self.stream.next()).await {
                Err(_) => return false,
                Ok(None) => return true,
                Ok(Some(Ok(Message::Close(_)))) => return true,
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(_))) => return true,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Seed one project with one session.
pub fn seed_catalog(store: &mut Store, project: &str, session: &str) -> (i64, i64) {
    let project_id = store.create_project(project, None).expect("create project");
    let session_id = store.create_session(project_id, session).expect("create session");
    (project_id, session_id)
}

/// Seed an agent attached to `session_id` with the given teams.
pub fn seed_agent(
    store: &mut Store,
    agent_id: &str,
    level: PermissionLevel,
    session_id: i64,
    teams: &[&str],
) {
    let spec = AgentSpec::new(agent_id, level)
        .with_session(session_id)
        .with_teams(teams.iter().map(|t| TeamId::new(*t)).collect());
    store.upsert_agent(&spec).expect("upsert agent");
}
