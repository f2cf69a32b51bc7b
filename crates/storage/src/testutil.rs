// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for storage tests.

use crate::store::{AgentSpec, Store};
use ctx_core::{AgentId, FakeClock, PermissionLevel, TeamId};
use std::sync::Arc;
use tempfile::TempDir;

/// A store on a scratch database with a controllable clock. The tempdir
/// must stay alive as long as the store.
pub(crate) fn store() -> (Store, FakeClock, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let clock = FakeClock::new();
    let store = Store::open_with_clock(dir.path().join("broker.db"), Arc::new(clock.clone()))
        .expect("open store");
    (store, clock, dir)
}

/// Seed a project with one session and return `(project_id, session_id)`.
pub(crate) fn seed_project(store: &mut Store, project: &str, session: &str) -> (i64, i64) {
    let project_id = store.create_project(project, None).expect("create project");
    let session_id = store.create_session(project_id, session).expect("create session");
    (project_id, session_id)
}

/// Seed an agent attached to `session_id`.
pub(crate) fn seed_agent(
    store: &mut Store,
    agent_id: &str,
    level: PermissionLevel,
    session_id: i64,
    teams: &[&str],
) -> AgentId {
    let spec = AgentSpec::new(agent_id, level)
        .with_session(session_id)
        .with_teams(teams.iter().map(|t| TeamId::new(*t)).collect());
    store.upsert_agent(&spec).expect("upsert agent");
    AgentId::new(agent_id)
}
