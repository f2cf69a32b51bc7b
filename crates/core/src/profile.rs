// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The requester-side view the permission resolver works from.

use crate::ids::{AgentId, TeamId};
use crate::permission::PermissionLevel;

/// Everything the resolver is allowed to know about a requesting agent:
/// its own row, plus the project derived from its session. The resolver
/// never reads anything else from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub agent_id: AgentId,
    pub permission_level: PermissionLevel,
    /// Session the agent is currently attached to, if any.
    pub session_id: Option<i64>,
    /// Project owning that session, derived by the store at lookup time.
    pub project_id: Option<i64>,
    pub teams: Vec<TeamId>,
}
