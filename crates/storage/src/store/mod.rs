// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store type and its connection lifecycle. Entity operations live in
//! the sibling modules (`catalog`, `connections`, `contexts`), all as
//! inherent methods so callers see one `Store` surface.

mod catalog;
mod connections;
mod contexts;

pub use catalog::AgentSpec;

use crate::error::StoreError;
use crate::schema;
use ctx_core::{Clock, SystemClock};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Typed persistence over one SQLite connection.
///
/// `Store` is `Send` but not `Sync`: the writer thread owns one instance
/// for all mutations, and readers share another behind a mutex. Both point
/// at the same WAL-mode database file.
pub struct Store {
    pub(crate) conn: Connection,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Open (creating if needed) the database at `path` with the system
    /// clock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open with an injected clock. Tests use this to control row
    /// timestamps.
    pub fn open_with_clock(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        schema::apply_pragmas(&conn)?;
        schema::migrate(&conn)?;
        Ok(Self { conn, clock })
    }

    /// Liveness probe for the admin surface.
    pub fn health_check(&self) -> Result<(), StoreError> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    pub(crate) fn now(&self) -> String {
        self.clock.timestamp()
    }
}

/// Drain a `query_map` iterator into a vec, converting row errors.
pub(crate) fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
