// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router assembly and the serve loop.

use crate::admin;
use crate::handlers::DaemonCtx;
use crate::ws;
use axum::routing::{delete, get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// One router carries both surfaces: the agent-facing WebSocket endpoint
/// and the operator-facing REST routes.
pub fn router(ctx: Arc<DaemonCtx>) -> Router {
    Router::new()
        .route("/ws/{connection_id}", get(ws::ws_handler))
        .route("/", get(admin::root))
        .route("/healthz", get(admin::healthz))
        .route("/status", get(admin::status))
        .route("/connections", get(admin::connections))
        .route("/agents", get(admin::agents))
        .route("/projects", get(admin::projects))
        .route("/sessions", get(admin::sessions))
        .route("/teams", get(admin::teams))
        .route("/contexts", get(admin::contexts))
        .route("/contexts/{context_id}", delete(admin::delete_context))
        .route("/agents/{agent_id}/assign/{connection_id}", post(admin::assign_agent))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Serve until `shutdown` resolves. Peer addresses are propagated so
/// connection rows can record the client IP.
pub async fn serve(
    listener: tokio::net::TcpListener,
    ctx: Arc<DaemonCtx>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        router(ctx).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
