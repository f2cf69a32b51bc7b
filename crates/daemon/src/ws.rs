// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket endpoint: `/ws/{connection_id}`.
//!
//! Lifecycle per socket: allowlist gate → register/auto-bind (one writer
//! job) → status broadcast → inbound loop. Frames are handled one at a
//! time, and the response is queued before the next frame is read, so
//! request order is preserved per connection. A dedicated sender task
//! owns the sink; responses and broadcasts share its channel and never
//! interleave on the wire.

use crate::handlers::{self, DaemonCtx};
use crate::writer::WriteOutcome;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Path, State};
use axum::response::IntoResponse;
use ctx_core::{AgentId, ConnectionId};
use ctx_wire::BroadcastEvent;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub(crate) async fn ws_handler(
    Path(connection_id): Path<String>,
    State(ctx): State<Arc<DaemonCtx>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        handle_socket(socket, ctx, ConnectionId::new(connection_id), peer)
    })
}

async fn handle_socket(
    socket: WebSocket,
    ctx: Arc<DaemonCtx>,
    connection_id: ConnectionId,
    peer: SocketAddr,
) {
    let ip = peer.ip().to_string();

    if !ctx.allowlist.is_allowed(connection_id.as_str()) {
        reject(socket, &ctx, &connection_id, &ip).await;
        return;
    }

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Single owner of the sink: drains the queue and writes each frame as
    // a text message until the socket or the channel closes.
    let sender = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    ctx.registry.attach(&connection_id, tx.clone());
    info!(connection = %connection_id, %ip, "connection established");

    register(&ctx, &connection_id, &ip).await;

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                let response = handlers::dispatch(&ctx, &connection_id, text.as_str()).await;
                match serde_json::to_string(&response) {
                    Ok(frame) => {
                        if tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => error!(error = %e, "failed to serialize response"),
                }
            }
            Message::Close(_) => break,
            // Binary frames and pings are ignored; axum answers pings.
            _ => {}
        }
    }

    info!(connection = %connection_id, "connection closed");
    let bound = ctx.registry.detach(&connection_id);
    drop(tx);

    let released = connection_id.clone();
    let result = ctx
        .writer
        .submit(Box::new(move |store| {
            store.release_connection(&released)?;
            Ok(WriteOutcome::Unit)
        }))
        .await;
    if let Err(e) = result {
        warn!(connection = %connection_id, error = %e, "failed to persist disconnect");
    }

    if let Some(agent) = bound {
        info!(agent = %agent, "agent disconnected");
        ctx.registry.broadcast(&BroadcastEvent::disconnected(&agent));
    }

    let _ = sender.await;
}

/// Persist the connection and auto-bind when the id matches an agent row,
/// all inside one writer job; then mirror the outcome in memory and
/// notify the fleet.
async fn register(ctx: &Arc<DaemonCtx>, connection_id: &ConnectionId, ip: &str) {
    let cid = connection_id.clone();
    let ip_owned = ip.to_string();
    let outcome = ctx
        .writer
        .submit(Box::new(move |store| {
            store.register_connection(&cid, Some(&ip_owned))?;
            let candidate = AgentId::new(cid.as_str());
            if store.agent_exists(&candidate)? {
                store.bind_connection(&cid, &candidate)?;
                Ok(WriteOutcome::Registered { auto_bound: true })
            } else {
                Ok(WriteOutcome::Registered { auto_bound: false })
            }
        }))
        .await;

    match outcome {
        Ok(WriteOutcome::Registered { auto_bound: true }) => {
            let agent = AgentId::new(connection_id.as_str());
            ctx.registry.bind(connection_id, &agent);
            info!(agent = %agent, "connection auto-assigned to matching agent");
            ctx.registry.broadcast(&BroadcastEvent::connected(&agent));
        }
        Ok(WriteOutcome::Registered { auto_bound: false }) => {
            info!(connection = %connection_id, "unknown connection registered as pending");
            ctx.registry.broadcast(&BroadcastEvent::pending(connection_id));
        }
        Ok(_) => error!("registration job returned an unexpected outcome"),
        Err(e) => warn!(connection = %connection_id, error = %e, "failed to register connection"),
    }
}

/// Allowlist refusal: record the row, tell the client why, close.
async fn reject(mut socket: WebSocket, ctx: &Arc<DaemonCtx>, connection_id: &ConnectionId, ip: &str) {
    warn!(connection = %connection_id, %ip, "rejected non-allowlisted connection");

    let cid = connection_id.clone();
    let ip_owned = ip.to_string();
    let result = ctx
        .writer
        .submit(Box::new(move |store| {
            store.mark_rejected(&cid, Some(&ip_owned))?;
            Ok(WriteOutcome::Unit)
        }))
        .await;
    if let Err(e) = result {
        warn!(connection = %connection_id, error = %e, "failed to record rejection");
    }

    if let Ok(frame) = serde_json::to_string(&BroadcastEvent::rejected(connection_id)) {
        let _ = socket.send(Message::Text(frame.into())).await;
    }
    let _ = socket.send(Message::Close(None)).await;
}
