// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog records shared between storage rows, admin JSON, and tests.
//!
//! Projects own sessions; agents attach to at most one session and carry a
//! set of team ids. Connections are broker-owned rows tracking every
//! WebSocket that ever registered, whether or not an agent was bound.

use crate::ids::{AgentId, ConnectionId, TeamId};
use crate::permission::PermissionLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// A session inside a project. Names are unique within their project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub created_at: String,
}

/// Teams exist independently of sessions; an agent may belong to several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub display_name: Option<String>,
    pub permission_level: PermissionLevel,
    pub teams: Vec<TeamId>,
    pub connection_id: Option<ConnectionId>,
    pub session_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
    pub last_seen: String,
}

/// Registry state of a connection row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Assigned,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Assigned => "assigned",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "assigned" => Ok(ConnectionStatus::Assigned),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(format!("invalid connection status: {other:?}")),
        }
    }
}

/// One WebSocket connection as persisted. Rows survive socket teardown so
/// the catalog can show history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connection_id: ConnectionId,
    pub ip_address: Option<String>,
    pub assigned_agent_id: Option<AgentId>,
    pub status: ConnectionStatus,
    pub first_seen: String,
    pub last_seen: String,
}

/// One visible chunk as returned by the read path.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub content: String,
    pub created_at: String,
}

/// Admin-surface view of one context: parent metadata plus chunk count and
/// a short preview of the first chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub context_id: i64,
    pub timestamp: String,
    /// `"<project name> -> <session name>"`, with `Unknown` placeholders.
    pub project_session: String,
    pub agent_id: AgentId,
    pub chunk_count: i64,
    pub context_summary: String,
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
