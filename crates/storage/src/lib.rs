// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ctx-storage: typed SQLite persistence for the context broker.
//!
//! The store exposes operations, not SQL. Callers get typed methods over
//! the catalog (projects, sessions, teams, agents), the connection
//! registry rows, and the context/chunk/embedding tables. Read filtering
//! goes through [`ChunkPredicate`], a composable value the permission
//! resolver builds from scope primitives; the store renders it without
//! ever interpreting permission levels.
//!
//! Failure classification matters here: [`StoreError::is_transient`] is
//! true exactly for SQLite BUSY/LOCKED conditions, which is the writer's
//! cue to retry. Everything else is permanent and propagates.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod predicate;
mod schema;
mod store;

pub use error::StoreError;
pub use predicate::ChunkPredicate;
pub use schema::SCHEMA_VERSION;
pub use store::{AgentSpec, Store};

#[cfg(test)]
pub(crate) mod testutil;
