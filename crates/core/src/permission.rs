// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission vocabulary for filtered reads.
//!
//! An agent's reads are bounded by one of four levels, widening in the
//! order `self < team < session < project`. The set is closed: any other
//! token is rejected at the boundary where it appears (request params,
//! agent rows, config).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Read-visibility level for an agent.
///
/// The derived `Ord` follows declaration order, which is the widening
/// order used by [`PermissionLevel::effective`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Own contexts, within the agent's current session.
    #[serde(rename = "self")]
    SelfOnly,
    /// Contexts from teammates (shared team membership) within the session.
    Team,
    /// Every context in the agent's current session.
    Session,
    /// Every context in the project the agent's session belongs to.
    Project,
}

/// A permission token outside the closed four-value set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid permission level: {0:?}")]
pub struct InvalidPermission(pub String);

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 4] = [
        PermissionLevel::SelfOnly,
        PermissionLevel::Team,
        PermissionLevel::Session,
        PermissionLevel::Project,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::SelfOnly => "self",
            PermissionLevel::Team => "team",
            PermissionLevel::Session => "session",
            PermissionLevel::Project => "project",
        }
    }

    /// Effective level for a request: a requested override may narrow the
    /// configured level but never widen it. A wider override is silently
    /// clamped to the configured level.
    pub fn effective(self, requested: Option<PermissionLevel>) -> PermissionLevel {
        match requested {
            Some(r) if r <= self => r,
            _ => self,
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = InvalidPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(PermissionLevel::SelfOnly),
            "team" => Ok(PermissionLevel::Team),
            "session" => Ok(PermissionLevel::Session),
            "project" => Ok(PermissionLevel::Project),
            other => Err(InvalidPermission(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
