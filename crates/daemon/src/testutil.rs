// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon tests.

use crate::allowlist::Allowlist;
use crate::embed::EmbedderKind;
use crate::env::Config;
use crate::handlers::DaemonCtx;
use crate::lifecycle::Daemon;
use ctx_core::{AgentId, ConnectionId, PermissionLevel, TeamId};
use ctx_storage::AgentSpec;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub(crate) fn test_config(dir: &TempDir) -> Config {
    Config {
        bind: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
        db_path: dir.path().join("broker.db"),
        embedder: EmbedderKind::Hash,
        embed_workers: 1,
        allowlist: Allowlist::default(),
    }
}

/// Bootstrapped daemon on a scratch database.
pub(crate) fn daemon() -> (Daemon, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let daemon = Daemon::bootstrap(&test_config(&dir)).expect("bootstrap");
    (daemon, dir)
}

/// Create a project + session pair through the shared read handle (tests
/// seed the catalog before traffic starts).
pub(crate) fn seed_catalog(ctx: &DaemonCtx, project: &str, session: &str) -> (i64, i64) {
    let mut store = ctx.reads.lock();
    let project_id = store.create_project(project, None).expect("create project");
    let session_id = store.create_session(project_id, session).expect("create session");
    (project_id, session_id)
}

pub(crate) fn seed_agent(
    ctx: &DaemonCtx,
    agent_id: &str,
    level: PermissionLevel,
    session_id: i64,
    teams: &[&str],
) -> AgentId {
    let spec = AgentSpec::new(agent_id, level)
        .with_session(session_id)
        .with_teams(teams.iter().map(|t| TeamId::new(*t)).collect());
    ctx.reads.lock().upsert_agent(&spec).expect("upsert agent");
    AgentId::new(agent_id)
}

/// Attach a fake socket and return its outbound receiver (frames the
/// server would have written to the wire, broadcasts included).
pub(crate) fn attach_socket(
    ctx: &DaemonCtx,
    connection_id: &str,
) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    ctx.registry.attach(&ConnectionId::new(connection_id), tx);
    rx
}

/// Attach and bind in one step, mirroring a completed auto-bind.
pub(crate) fn attach_bound_socket(
    ctx: &DaemonCtx,
    connection_id: &str,
    agent_id: &AgentId,
) -> mpsc::UnboundedReceiver<String> {
    let rx = attach_socket(ctx, connection_id);
    ctx.registry.bind(&ConnectionId::new(connection_id), agent_id);
    rx
}
