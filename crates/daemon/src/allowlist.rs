// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional agent allowlist.
//!
//! Policy, not correctness: an empty set allows everyone. Ids come from
//! the `CTX_AGENT_ALLOWLIST` env var (comma-separated) unioned with the
//! file named by `CTX_AGENT_ALLOWLIST_FILE` (one id per line, `#`
//! comments). The file is re-read at each decision point, so operators
//! can edit it without a restart; a missing file is an empty set, never
//! an error.

use std::collections::HashSet;
use std::path::PathBuf;

pub const ALLOWLIST_ENV: &str = "CTX_AGENT_ALLOWLIST";
pub const ALLOWLIST_FILE_ENV: &str = "CTX_AGENT_ALLOWLIST_FILE";

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    env_ids: HashSet<String>,
    file: Option<PathBuf>,
}

impl Allowlist {
    pub fn from_env() -> Self {
        let env_ids = std::env::var(ALLOWLIST_ENV)
            .map(|value| parse_csv(&value))
            .unwrap_or_default();
        let file = std::env::var(ALLOWLIST_FILE_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self { env_ids, file }
    }

    pub fn new(env_ids: HashSet<String>, file: Option<PathBuf>) -> Self {
        Self { env_ids, file }
    }

    /// Allow-all when the effective set is empty.
    pub fn is_allowed(&self, agent_id: &str) -> bool {
        let ids = self.snapshot();
        ids.is_empty() || ids.contains(agent_id)
    }

    /// The effective set right now: env ids plus a fresh read of the file.
    pub fn snapshot(&self) -> HashSet<String> {
        let mut ids = self.env_ids.clone();
        if let Some(path) = &self.file {
            if let Ok(contents) = std::fs::read_to_string(path) {
                ids.extend(parse_lines(&contents));
            }
        }
        ids
    }
}

fn parse_csv(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_lines(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "allowlist_tests.rs"]
mod tests;
