// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use crate::allowlist::Allowlist;
use crate::embed::EmbedderKind;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Socket the broker binds for both the WebSocket endpoint and the admin
/// surface. Defaults to localhost.
pub fn bind_addr() -> SocketAddr {
    std::env::var("CTX_BIND")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8765)))
}

/// Database file path, created on first open.
pub fn db_path() -> PathBuf {
    std::env::var("CTX_DB_PATH")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("context_broker.db"))
}

/// Embedding backend: `hash` (built-in, default) or `none` to disable the
/// pipeline entirely.
pub fn embedder_kind() -> EmbedderKind {
    match std::env::var("CTX_EMBEDDER").ok().as_deref() {
        Some("none") => EmbedderKind::None,
        _ => EmbedderKind::Hash,
    }
}

/// Embedder worker pool size, clamped to a small constant.
pub fn embed_workers() -> usize {
    std::env::var("CTX_EMBED_WORKERS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(2)
        .clamp(1, 4)
}

/// Everything the daemon needs at startup, gathered once so tests can
/// build a config by hand instead of mutating process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub embedder: EmbedderKind,
    pub embed_workers: usize,
    pub allowlist: Allowlist,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind: bind_addr(),
            db_path: db_path(),
            embedder: embedder_kind(),
            embed_workers: embed_workers(),
            allowlist: Allowlist::from_env(),
        }
    }
}
