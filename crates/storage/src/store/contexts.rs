// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context parents, chunks, and embeddings.
//!
//! A context and its chunks are inserted inside one transaction; partial
//! success is never observable. Chunks copy the parent's scope columns
//! (`agent_id`, `session_id`, `project_id`) and share its timestamp, so
//! the read path can filter on chunks alone.

use super::{collect, Store};
use crate::error::StoreError;
use crate::predicate::ChunkPredicate;
use ctx_core::{AgentId, ChunkHit, ContextSummary};
use rusqlite::{params, params_from_iter};

impl Store {
    /// Persist one context plus its ordered chunks atomically. Returns the
    /// new context id and the chunk row ids in `chunk_index` order.
    pub fn insert_context(
        &mut self,
        agent_id: &AgentId,
        session_id: i64,
        project_id: i64,
        chunks: &[String],
    ) -> Result<(i64, Vec<i64>), StoreError> {
        let now = self.now();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO contexts (agent_id, session_id, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![agent_id.as_str(), session_id, project_id, now],
        )?;
        let context_id = tx.last_insert_rowid();

        let mut chunk_ids = Vec::with_capacity(chunks.len());
        for (index, content) in chunks.iter().enumerate() {
            tx.execute(
                "INSERT INTO context_chunks
                     (context_id, chunk_index, chunk_content, agent_id, session_id,
                      project_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    context_id,
                    index as i64,
                    content,
                    agent_id.as_str(),
                    session_id,
                    project_id,
                    now,
                ],
            )?;
            chunk_ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok((context_id, chunk_ids))
    }

    /// The most recent chunks matching `predicate`, newest first with a
    /// stable tie-break on parent context id then chunk order.
    pub fn chunks_visible(
        &self,
        predicate: &ChunkPredicate,
        limit: usize,
    ) -> Result<Vec<ChunkHit>, StoreError> {
        let (where_sql, mut params) = predicate.where_clause();
        let sql = format!(
            "SELECT cc.chunk_content, cc.created_at
             FROM context_chunks cc
             WHERE {where_sql}
             ORDER BY cc.created_at DESC, cc.context_id ASC, cc.chunk_index ASC
             LIMIT ?"
        );
        params.push(rusqlite::types::Value::from(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(ChunkHit { content: row.get(0)?, created_at: row.get(1)? })
        })?;
        collect(rows)
    }

    /// Fetch chunk texts by id for the embedder. Unknown ids are skipped.
    pub fn chunk_texts(&self, chunk_ids: &[i64]) -> Result<Vec<(i64, String)>, StoreError> {
        if chunk_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; chunk_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, chunk_content FROM context_chunks WHERE id IN ({placeholders}) ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk_ids.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        collect(rows)
    }

    /// Upsert one embedding row per chunk, vectors stored as little-endian
    /// f32 bytes.
    pub fn store_embeddings(&mut self, rows: &[(i64, Vec<f32>)]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for (chunk_id, vector) in rows {
            let mut blob = Vec::with_capacity(vector.len() * 4);
            for value in vector {
                blob.extend_from_slice(&value.to_le_bytes());
            }
            tx.execute(
                "INSERT INTO context_chunk_embeddings (chunk_id, embedding, dim)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(chunk_id) DO UPDATE SET
                     embedding = excluded.embedding,
                     dim = excluded.dim",
                params![chunk_id, blob, vector.len() as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn embedding(&self, chunk_id: i64) -> Result<Option<Vec<f32>>, StoreError> {
        use rusqlite::OptionalExtension;
        let blob: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT embedding FROM context_chunk_embeddings WHERE chunk_id = ?1",
                params![chunk_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob.map(|bytes| {
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        }))
    }

    /// Newest-first context listing for the admin surface, with chunk
    /// count and a 100-character preview of the first chunk.
    pub fn list_contexts(&self) -> Result<Vec<ContextSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.created_at, p.name, s.name, c.agent_id,
                    (SELECT COUNT(*) FROM context_chunks cc WHERE cc.context_id = c.id),
                    (SELECT substr(cc.chunk_content, 1, 100) FROM context_chunks cc
                     WHERE cc.context_id = c.id ORDER BY cc.chunk_index LIMIT 1)
             FROM contexts c
             LEFT JOIN projects p ON c.project_id = p.id
             LEFT JOIN sessions s ON c.session_id = s.id
             ORDER BY c.created_at DESC, c.id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let project: Option<String> = row.get(2)?;
            let session: Option<String> = row.get(3)?;
            Ok(ContextSummary {
                context_id: row.get(0)?,
                timestamp: row.get(1)?,
                project_session: format!(
                    "{} -> {}",
                    project.unwrap_or_else(|| "Unknown".into()),
                    session.unwrap_or_else(|| "Unknown".into()),
                ),
                agent_id: AgentId::new(row.get::<_, String>(4)?),
                chunk_count: row.get(5)?,
                context_summary: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?;
        collect(rows)
    }

    /// Delete a context; chunks and embeddings go with it via the schema
    /// cascades. Returns whether a row existed.
    pub fn delete_context(&mut self, context_id: i64) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM contexts WHERE id = ?1", params![context_id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
#[path = "contexts_tests.rs"]
mod tests;
