// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection rows and the 1:1 agent binding.
//!
//! The connection ↔ agent link is stored as two rows each carrying the
//! other's id; the bind operation updates both inside one transaction so
//! the pair can never be observed half-linked.

use super::{collect, Store};
use crate::error::StoreError;
use ctx_core::{AgentId, Connection, ConnectionId, ConnectionStatus};
use rusqlite::{params, OptionalExtension};

impl Store {
    /// Idempotent upsert of a connection row, status `pending`. A repeat
    /// registration refreshes `last_seen` and keeps the original status.
    pub fn register_connection(
        &mut self,
        connection_id: &ConnectionId,
        ip_address: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT INTO connections (connection_id, ip_address, status, first_seen, last_seen)
             VALUES (?1, ?2, 'pending', ?3, ?3)
             ON CONFLICT(connection_id) DO UPDATE SET
                 last_seen = excluded.last_seen,
                 ip_address = COALESCE(excluded.ip_address, connections.ip_address)",
            params![connection_id.as_str(), ip_address, now],
        )?;
        Ok(())
    }

    /// Set the 1:1 link on both sides and transition the connection to
    /// `assigned`. Any previous connection of the agent and any previous
    /// agent of the connection are unlinked first. Idempotent for an
    /// already-bound pair.
    pub fn bind_connection(
        &mut self,
        connection_id: &ConnectionId,
        agent_id: &AgentId,
    ) -> Result<(), StoreError> {
        let now = self.now();
        let tx = self.conn.transaction()?;

        let agent_known: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM agents WHERE agent_id = ?1",
                params![agent_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if agent_known.is_none() {
            return Err(StoreError::NotFound("agent"));
        }

        tx.execute(
            "INSERT OR IGNORE INTO connections (connection_id, status, first_seen, last_seen)
             VALUES (?1, 'pending', ?2, ?2)",
            params![connection_id.as_str(), now],
        )?;
        tx.execute(
            "UPDATE connections SET assigned_agent_id = NULL, status = 'pending'
             WHERE assigned_agent_id = ?1 AND connection_id <> ?2",
            params![agent_id.as_str(), connection_id.as_str()],
        )?;
        tx.execute(
            "UPDATE agents SET connection_id = NULL
             WHERE connection_id = ?1 AND agent_id <> ?2",
            params![connection_id.as_str(), agent_id.as_str()],
        )?;
        tx.execute(
            "UPDATE connections SET assigned_agent_id = ?1, status = 'assigned', last_seen = ?2
             WHERE connection_id = ?3",
            params![agent_id.as_str(), now, connection_id.as_str()],
        )?;
        tx.execute(
            "UPDATE agents SET connection_id = ?1, is_active = 1, last_seen = ?2
             WHERE agent_id = ?3",
            params![connection_id.as_str(), now, agent_id.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Undo the binding on socket teardown or explicit unassign: the agent
    /// side is nulled and the connection returns to `pending`. Rows are
    /// kept so the catalog shows history. A `rejected` row stays rejected.
    pub fn release_connection(&mut self, connection_id: &ConnectionId) -> Result<(), StoreError> {
        let now = self.now();
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE agents SET connection_id = NULL, last_seen = ?1 WHERE connection_id = ?2",
            params![now, connection_id.as_str()],
        )?;
        tx.execute(
            "UPDATE connections SET
                 assigned_agent_id = NULL,
                 status = CASE WHEN status = 'assigned' THEN 'pending' ELSE status END,
                 last_seen = ?1
             WHERE connection_id = ?2",
            params![now, connection_id.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Record an allowlist refusal. Upserts so a repeat offender keeps one
    /// row.
    pub fn mark_rejected(
        &mut self,
        connection_id: &ConnectionId,
        ip_address: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT INTO connections (connection_id, ip_address, status, first_seen, last_seen)
             VALUES (?1, ?2, 'rejected', ?3, ?3)
             ON CONFLICT(connection_id) DO UPDATE SET
                 status = 'rejected',
                 last_seen = excluded.last_seen",
            params![connection_id.as_str(), ip_address, now],
        )?;
        Ok(())
    }

    pub fn connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Connection>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT connection_id, ip_address, assigned_agent_id, status, first_seen, last_seen
                 FROM connections WHERE connection_id = ?1",
                params![connection_id.as_str()],
                map_connection,
            )
            .optional()?;
        row.map(finish_connection).transpose()
    }

    pub fn list_connections(&self) -> Result<Vec<Connection>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT connection_id, ip_address, assigned_agent_id, status, first_seen, last_seen
             FROM connections ORDER BY first_seen DESC, id DESC",
        )?;
        let rows = collect(stmt.query_map([], map_connection)?)?;
        rows.into_iter().map(finish_connection).collect()
    }
}

type ConnectionRow = (String, Option<String>, Option<String>, String, String, String);

fn map_connection(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConnectionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn finish_connection(row: ConnectionRow) -> Result<Connection, StoreError> {
    let (connection_id, ip_address, assigned_agent_id, status, first_seen, last_seen) = row;
    let status: ConnectionStatus = status
        .parse()
        .map_err(|_| StoreError::Invalid { field: "status", value: status.clone() })?;
    Ok(Connection {
        connection_id: ConnectionId::new(connection_id),
        ip_address,
        assigned_agent_id: assigned_agent_id.map(AgentId::new),
        status,
        first_seen,
        last_seen,
    })
}

#[cfg(test)]
#[path = "connections_tests.rs"]
mod tests;
