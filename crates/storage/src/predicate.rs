// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composable chunk visibility predicate.
//!
//! The permission resolver combines the primitives below into one value;
//! the store renders it into a WHERE clause over `context_chunks` (aliased
//! `cc`). The store never sees permission levels — only composed scopes.

use ctx_core::{AgentId, TeamId};
use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq)]
struct TeamOverlap {
    author: String,
    teams: Vec<String>,
}

/// Row filter over `context_chunks`, AND-combined from scope primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkPredicate {
    author: Option<String>,
    session: Option<i64>,
    project: Option<i64>,
    team_overlap: Option<TeamOverlap>,
    since: Option<String>,
}

impl ChunkPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only chunks authored by `agent_id`.
    pub fn by_author(mut self, agent_id: &AgentId) -> Self {
        self.author = Some(agent_id.to_string());
        self
    }

    /// Only chunks written into `session_id`.
    pub fn by_session(mut self, session_id: i64) -> Self {
        self.session = Some(session_id);
        self
    }

    /// Only chunks written into `project_id`.
    pub fn by_project(mut self, project_id: i64) -> Self {
        self.project = Some(project_id);
        self
    }

    /// Chunks authored by `agent_id` itself, or by any agent whose team set
    /// intersects `teams`. With an empty team set this degrades to
    /// author-only visibility.
    pub fn by_team_overlap(mut self, agent_id: &AgentId, teams: &[TeamId]) -> Self {
        self.team_overlap = Some(TeamOverlap {
            author: agent_id.to_string(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Only chunks strictly newer than `ts`.
    pub fn since(mut self, ts: impl Into<String>) -> Self {
        self.since = Some(ts.into());
        self
    }

    /// Render to a WHERE body plus positional parameters, in a fixed
    /// clause order so identical predicates produce identical SQL.
    pub(crate) fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(author) = &self.author {
            clauses.push("cc.agent_id = ?".into());
            params.push(Value::from(author.clone()));
        }
        if let Some(session) = self.session {
            clauses.push("cc.session_id = ?".into());
            params.push(Value::from(session));
        }
        if let Some(project) = self.project {
            clauses.push("cc.project_id = ?".into());
            params.push(Value::from(project));
        }
        if let Some(overlap) = &self.team_overlap {
            if overlap.teams.is_empty() {
                clauses.push("cc.agent_id = ?".into());
                params.push(Value::from(overlap.author.clone()));
            } else {
                let placeholders = vec!["?"; overlap.teams.len()].join(", ");
                clauses.push(format!(
                    "(cc.agent_id = ? OR EXISTS (\
                         SELECT 1 FROM agents a, json_each(a.teams) jt \
                         WHERE a.agent_id = cc.agent_id AND jt.value IN ({placeholders})))"
                ));
                params.push(Value::from(overlap.author.clone()));
                for team in &overlap.teams {
                    params.push(Value::from(team.clone()));
                }
            }
        }
        if let Some(since) = &self.since {
            clauses.push("cc.created_at > ?".into());
            params.push(Value::from(since.clone()));
        }

        if clauses.is_empty() {
            ("1".into(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
