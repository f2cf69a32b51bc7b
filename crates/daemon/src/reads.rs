// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read service: execute a resolved predicate and project the result.

use ctx_storage::{ChunkPredicate, Store, StoreError};
use ctx_wire::ChunkView;

/// Most recent chunks returned per ReadDB.
pub const READ_LIMIT: usize = 10;

/// Run the predicate and shape each row as `{context, timestamp}`.
/// An empty result is an empty vec, never an error.
pub fn latest_chunks(
    store: &Store,
    predicate: &ChunkPredicate,
) -> Result<Vec<ChunkView>, StoreError> {
    Ok(store
        .chunks_visible(predicate, READ_LIMIT)?
        .into_iter()
        .map(|hit| ChunkView { context: hit.content, timestamp: hit.created_at })
        .collect())
}
