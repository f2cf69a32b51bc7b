// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin HTTP surface.
//!
//! Read-only enumeration of the catalog, connections, and contexts, plus
//! the two mutating actions (assign, delete-context), which go through
//! the writer like every other mutation. Served from the same listener
//! as the WebSocket endpoint, bound to localhost by default.

use crate::handlers::DaemonCtx;
use crate::writer::{WriteOutcome, WriterError};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ctx_core::{AgentId, ConnectionId};
use ctx_storage::StoreError;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

type AdminError = (StatusCode, Json<Value>);
type AdminResult = Result<Json<Value>, AdminError>;

fn internal(e: impl std::fmt::Display) -> AdminError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": e.to_string()})))
}

fn not_found(detail: &str) -> AdminError {
    (StatusCode::NOT_FOUND, Json(json!({"detail": detail})))
}

/// `GET /` — server identity and endpoint map.
pub(crate) async fn root() -> Json<Value> {
    Json(json!({
        "name": "Multi-Agent Context Broker",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Context broker for multi-agent clients with a permission-filtered read path",
        "endpoints": {
            "websocket": "/ws/{connection_id}",
            "status": "/status",
            "connections": "/connections",
            "agents": "/agents",
        },
    }))
}

/// `GET /healthz`
pub(crate) async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `GET /status`
pub(crate) async fn status(State(ctx): State<Arc<DaemonCtx>>) -> Json<Value> {
    let database = match ctx.reads.lock().health_check() {
        Ok(()) => "connected",
        Err(_) => "error",
    };
    Json(json!({
        "status": "running",
        "active_connections": ctx.registry.active_count(),
        "database": database,
    }))
}

/// `GET /connections`
pub(crate) async fn connections(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_connections().map_err(internal)?;
    Ok(Json(json!({"connections": rows})))
}

/// `GET /agents` — `teams` decoded to a list.
pub(crate) async fn agents(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_agents().map_err(internal)?;
    Ok(Json(json!({"agents": rows})))
}

/// `GET /projects`
pub(crate) async fn projects(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_projects().map_err(internal)?;
    Ok(Json(json!({"projects": rows})))
}

/// `GET /sessions`
pub(crate) async fn sessions(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_sessions().map_err(internal)?;
    Ok(Json(json!({"sessions": rows})))
}

/// `GET /teams`
pub(crate) async fn teams(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_teams().map_err(internal)?;
    Ok(Json(json!({"teams": rows})))
}

/// `GET /contexts` — newest-first with chunk counts and previews.
pub(crate) async fn contexts(State(ctx): State<Arc<DaemonCtx>>) -> AdminResult {
    let rows = ctx.reads.lock().list_contexts().map_err(internal)?;
    Ok(Json(json!({"contexts": rows})))
}

/// `DELETE /contexts/{id}` — cascades to chunks and embeddings.
pub(crate) async fn delete_context(
    State(ctx): State<Arc<DaemonCtx>>,
    Path(context_id): Path<i64>,
) -> AdminResult {
    let outcome = ctx
        .writer
        .submit(Box::new(move |store| {
            Ok(WriteOutcome::Deleted { found: store.delete_context(context_id)? })
        }))
        .await;

    match outcome {
        Ok(WriteOutcome::Deleted { found: true }) => {
            info!(context_id, "context deleted");
            Ok(Json(json!({"success": true, "message": format!("Context {context_id} deleted")})))
        }
        Ok(WriteOutcome::Deleted { found: false }) => Err(not_found("Context not found")),
        Ok(_) => Err(internal("unexpected write outcome")),
        Err(e) => Err(internal(e)),
    }
}

/// `POST /agents/{agent_id}/assign/{connection_id}` — idempotent 1:1 bind.
pub(crate) async fn assign_agent(
    State(ctx): State<Arc<DaemonCtx>>,
    Path((agent_id, connection_id)): Path<(String, String)>,
) -> AdminResult {
    let agent = AgentId::new(agent_id);
    let connection = ConnectionId::new(connection_id);

    if !ctx.allowlist.is_allowed(agent.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": format!("Agent {agent} is not allowlisted")})),
        ));
    }

    let (job_agent, job_connection) = (agent.clone(), connection.clone());
    let outcome = ctx
        .writer
        .submit(Box::new(move |store| {
            store.bind_connection(&job_connection, &job_agent)?;
            Ok(WriteOutcome::Unit)
        }))
        .await;

    match outcome {
        Ok(_) => {
            // Mirror the binding in memory when the socket is live.
            ctx.registry.bind(&connection, &agent);
            info!(agent = %agent, connection = %connection, "agent assigned to connection");
            Ok(Json(json!({
                "success": true,
                "message": format!("Agent {agent} assigned to connection {connection}"),
            })))
        }
        Err(WriterError::Store(StoreError::NotFound(what))) => {
            Err(not_found(&format!("{what} not found")))
        }
        Err(e) => Err(internal(e)),
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
