// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog operations: projects, sessions, teams, agents.
//!
//! Rows get here administratively (operators, tests, seeding); the broker
//! core only ever reads them, except for the connection-binding columns on
//! agents which are owned by the connection lifecycle.

use super::{collect, Store};
use crate::error::StoreError;
use ctx_core::{Agent, AgentId, AgentProfile, PermissionLevel, Project, Session, Team, TeamId};
use rusqlite::{params, OptionalExtension};

/// Input for creating or updating an agent row.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub agent_id: AgentId,
    pub display_name: Option<String>,
    pub permission_level: PermissionLevel,
    pub teams: Vec<TeamId>,
    pub session_id: Option<i64>,
}

impl AgentSpec {
    pub fn new(agent_id: impl Into<AgentId>, permission_level: PermissionLevel) -> Self {
        Self {
            agent_id: agent_id.into(),
            display_name: None,
            permission_level,
            teams: Vec::new(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: i64) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_teams(mut self, teams: Vec<TeamId>) -> Self {
        self.teams = teams;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl Store {
    pub fn create_project(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<i64, StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT INTO projects (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_session(&mut self, project_id: i64, name: &str) -> Result<i64, StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT INTO sessions (project_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![project_id, name, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_team(
        &mut self,
        team_id: &TeamId,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT INTO teams (team_id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![team_id.as_str(), name, description, now],
        )?;
        Ok(())
    }

    /// Insert or update an agent row. Binding columns (`connection_id`,
    /// `is_active`) are left to the connection lifecycle.
    pub fn upsert_agent(&mut self, spec: &AgentSpec) -> Result<(), StoreError> {
        let now = self.now();
        let teams = teams_json(&spec.teams);
        self.conn.execute(
            "INSERT INTO agents
                 (agent_id, display_name, permission_level, teams, session_id,
                  is_active, created_at, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             ON CONFLICT(agent_id) DO UPDATE SET
                 display_name = excluded.display_name,
                 permission_level = excluded.permission_level,
                 teams = excluded.teams,
                 session_id = excluded.session_id,
                 last_seen = excluded.last_seen",
            params![
                spec.agent_id.as_str(),
                spec.display_name,
                spec.permission_level.as_str(),
                teams,
                spec.session_id,
                now,
            ],
        )?;
        Ok(())
    }

    /// Attach an agent to a session (or detach with `None`).
    pub fn assign_agent_session(
        &mut self,
        agent_id: &AgentId,
        session_id: Option<i64>,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE agents SET session_id = ?1 WHERE agent_id = ?2",
            params![session_id, agent_id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("agent"));
        }
        Ok(())
    }

    /// Seed the default project/session pair the original catalog ships
    /// with. Idempotent.
    pub fn ensure_default_catalog(&mut self) -> Result<(i64, i64), StoreError> {
        let now = self.now();
        self.conn.execute(
            "INSERT OR IGNORE INTO projects (id, name, description, created_at)
             VALUES (1, 'Default Project', 'Default project for context management', ?1)",
            params![now],
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO sessions (id, project_id, name, created_at)
             VALUES (1, 1, 'Default Session', ?1)",
            params![now],
        )?;
        Ok((1, 1))
    }

    pub fn agent_exists(&self, agent_id: &AgentId) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM agents WHERE agent_id = ?1",
                params![agent_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// The requester-side view the permission resolver works from: the
    /// agent's own row plus the project derived from its session.
    pub fn agent_profile(&self, agent_id: &AgentId) -> Result<Option<AgentProfile>, StoreError> {
        let row: Option<(String, String, Option<i64>, Option<i64>)> = self
            .conn
            .query_row(
                "SELECT a.permission_level, a.teams, a.session_id, s.project_id
                 FROM agents a
                 LEFT JOIN sessions s ON s.id = a.session_id
                 WHERE a.agent_id = ?1",
                params![agent_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((level, teams, session_id, project_id)) = row else {
            return Ok(None);
        };
        Ok(Some(AgentProfile {
            agent_id: agent_id.clone(),
            permission_level: parse_level(&level)?,
            session_id,
            project_id,
            teams: parse_teams(&teams),
        }))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at
             FROM projects ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        collect(rows)
    }

    pub fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, name, created_at
             FROM sessions ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Session {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        collect(rows)
    }

    pub fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT team_id, name, description, created_at
             FROM teams ORDER BY created_at DESC, team_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Team {
                team_id: TeamId::new(row.get::<_, String>(0)?),
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        collect(rows)
    }

    pub fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT agent_id, display_name, permission_level, teams, connection_id,
                    session_id, is_active, created_at, last_seen
             FROM agents ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<i64>>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut agents = Vec::new();
        for row in rows {
            let (agent_id, display_name, level, teams, connection_id, session_id, is_active, created_at, last_seen) =
                row?;
            agents.push(Agent {
                agent_id: AgentId::new(agent_id),
                display_name,
                permission_level: parse_level(&level)?,
                teams: parse_teams(&teams),
                connection_id: connection_id.map(ctx_core::ConnectionId::new),
                session_id,
                is_active,
                created_at,
                last_seen,
            });
        }
        Ok(agents)
    }
}

fn parse_level(token: &str) -> Result<PermissionLevel, StoreError> {
    token
        .parse()
        .map_err(|_| StoreError::Invalid { field: "permission_level", value: token.to_string() })
}

/// Stored team sets are JSON arrays; a malformed value reads as empty
/// rather than poisoning the whole row.
fn parse_teams(json: &str) -> Vec<TeamId> {
    serde_json::from_str::<Vec<String>>(json)
        .unwrap_or_default()
        .into_iter()
        .map(TeamId::new)
        .collect()
}

fn teams_json(teams: &[TeamId]) -> String {
    serde_json::to_string(&teams.iter().map(|t| t.as_str()).collect::<Vec<_>>())
        .unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
