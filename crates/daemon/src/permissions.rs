// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission resolver: requester → chunk predicate.
//!
//! Deterministic translation of an agent's profile (plus an optional
//! narrowing override) into the scope primitives the store composes.
//! The resolver reads nothing beyond the requester's own profile.

use ctx_core::{AgentProfile, PermissionLevel};
use ctx_storage::ChunkPredicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("agent is not attached to a session")]
    NoSession,

    #[error("agent's session has no project")]
    NoProject,
}

/// Build the predicate bounding what `profile` may read.
///
/// - `self`    → own chunks within the current session
/// - `team`    → session chunks from the requester or team-overlapping authors
/// - `session` → everything in the current session
/// - `project` → everything in the session's project, across sessions
///
/// A `requested` override may narrow but never widen; `since` is
/// AND-combined when present.
pub fn resolve(
    profile: &AgentProfile,
    requested: Option<PermissionLevel>,
    since: Option<&str>,
) -> Result<ChunkPredicate, ResolveError> {
    let level = profile.permission_level.effective(requested);
    let session = profile.session_id.ok_or(ResolveError::NoSession)?;

    let predicate = match level {
        PermissionLevel::SelfOnly => ChunkPredicate::new()
            .by_author(&profile.agent_id)
            .by_session(session),
        PermissionLevel::Team => ChunkPredicate::new()
            .by_session(session)
            .by_team_overlap(&profile.agent_id, &profile.teams),
        PermissionLevel::Session => ChunkPredicate::new().by_session(session),
        PermissionLevel::Project => {
            let project = profile.project_id.ok_or(ResolveError::NoProject)?;
            ChunkPredicate::new().by_project(project)
        }
    };

    Ok(match since {
        Some(ts) => predicate.since(ts),
        None => predicate,
    })
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;
