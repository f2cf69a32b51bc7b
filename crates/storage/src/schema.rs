// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema, pragmas, and migration.
//!
//! The schema is versioned through a `meta` table. Deletion cascades are
//! declared here (project → sessions → contexts → chunks → embeddings) so
//! administrative deletes never leave orphans.

use crate::error::StoreError;
use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

/// Connection-level pragmas: WAL for concurrent readers alongside the
/// single writer, foreign keys on, and a busy timeout so writers queue
/// behind each other instead of failing immediately.
pub(crate) const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
"#;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(project_id, name)
);

CREATE TABLE IF NOT EXISTS teams (
    team_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS agents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    agent_id TEXT UNIQUE NOT NULL,
    display_name TEXT,
    permission_level TEXT NOT NULL DEFAULT 'team'
        CHECK (permission_level IN ('self', 'team', 'session', 'project')),
    teams TEXT NOT NULL DEFAULT '[]',
    connection_id TEXT UNIQUE,
    session_id INTEGER REFERENCES sessions(id) ON DELETE SET NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    last_seen TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS connections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    connection_id TEXT UNIQUE NOT NULL,
    ip_address TEXT,
    assigned_agent_id TEXT REFERENCES agents(agent_id) ON DELETE SET NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'assigned', 'rejected')),
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contexts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    agent_id TEXT NOT NULL REFERENCES agents(agent_id) ON DELETE CASCADE,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS context_chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    context_id INTEGER NOT NULL REFERENCES contexts(id) ON DELETE CASCADE,
    chunk_index INTEGER NOT NULL,
    chunk_content TEXT NOT NULL,
    agent_id TEXT NOT NULL,
    session_id INTEGER NOT NULL,
    project_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(context_id, chunk_index)
);

CREATE TABLE IF NOT EXISTS context_chunk_embeddings (
    chunk_id INTEGER PRIMARY KEY REFERENCES context_chunks(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dim INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_agents_agent_id ON agents(agent_id);
CREATE INDEX IF NOT EXISTS idx_agents_session_id ON agents(session_id);
CREATE INDEX IF NOT EXISTS idx_agents_is_active ON agents(is_active);

CREATE INDEX IF NOT EXISTS idx_connections_connection_id ON connections(connection_id);
CREATE INDEX IF NOT EXISTS idx_connections_assigned_agent_id ON connections(assigned_agent_id);
CREATE INDEX IF NOT EXISTS idx_connections_status ON connections(status);

CREATE INDEX IF NOT EXISTS idx_sessions_project_id ON sessions(project_id);

CREATE INDEX IF NOT EXISTS idx_contexts_session_created
    ON contexts(session_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_contexts_agent_created
    ON contexts(agent_id, created_at DESC);

CREATE INDEX IF NOT EXISTS idx_chunks_context_index
    ON context_chunks(context_id, chunk_index);
CREATE INDEX IF NOT EXISTS idx_chunks_session_created
    ON context_chunks(session_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_chunks_agent_created
    ON context_chunks(agent_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_chunks_project_created
    ON context_chunks(project_id, created_at DESC);
"#;

pub(crate) fn apply_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(PRAGMAS)?;
    Ok(())
}

pub(crate) fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let current = schema_version(conn)?;
    match current {
        0 => {
            conn.execute_batch(SCHEMA_V1)?;
            conn.execute(
                "INSERT INTO meta(key, value) VALUES('schema_version', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [SCHEMA_VERSION.to_string()],
            )?;
            tracing::info!(version = SCHEMA_VERSION, "created database schema");
            Ok(())
        }
        v if v == SCHEMA_VERSION => Ok(()),
        v => Err(StoreError::Invalid { field: "schema_version", value: v.to_string() }),
    }
}

pub(crate) fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    use rusqlite::OptionalExtension;
    let version: Option<String> = conn
        .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
        .optional()?;
    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}
