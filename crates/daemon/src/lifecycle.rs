// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon assembly and teardown.
//!
//! Startup order: open the write store (seeding the default catalog),
//! open the shared read store, start the writer, start the embed pool,
//! then hand the context to the server. Teardown drains the embed pool,
//! then the writer — so every job enqueued before shutdown reaches a
//! terminal state.

use crate::embed::{self, EmbedderKind, EmbeddingModel, HashEmbedding};
use crate::env::Config;
use crate::handlers::DaemonCtx;
use crate::registry::ConnectionRegistry;
use crate::writer::{self, WriterWorker};
use ctx_storage::{Store, StoreError};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A bootstrapped broker: the shared context plus the worker handles the
/// lifecycle owns until shutdown.
pub struct Daemon {
    pub ctx: Arc<DaemonCtx>,
    writer_worker: WriterWorker,
    embed_pool: Option<embed::EmbedPool>,
}

impl Daemon {
    /// Assemble all long-lived pieces. Must run inside a tokio runtime
    /// (the writer and embed workers are spawned here).
    pub fn bootstrap(config: &Config) -> Result<Self, LifecycleError> {
        let mut writer_store = Store::open(&config.db_path)?;
        writer_store.ensure_default_catalog()?;
        let reads = Arc::new(Mutex::new(Store::open(&config.db_path)?));

        let (writer, writer_worker) = writer::spawn(writer_store);

        let (embedder, embed_pool) = match config.embedder {
            EmbedderKind::None => (None, None),
            EmbedderKind::Hash => {
                let model: Arc<dyn EmbeddingModel> = Arc::new(HashEmbedding::default());
                let (queue, pool) = embed::spawn(
                    model,
                    Arc::clone(&reads),
                    writer.clone(),
                    config.embed_workers,
                );
                (Some(queue), Some(pool))
            }
        };

        let ctx = Arc::new(DaemonCtx {
            registry: ConnectionRegistry::new(),
            writer,
            reads,
            embedder,
            allowlist: config.allowlist.clone(),
        });

        Ok(Self { ctx, writer_worker, embed_pool })
    }

    /// Drain and stop the embed pool, then the writer.
    pub async fn shutdown(self) {
        if let Some(pool) = self.embed_pool {
            pool.shutdown().await;
        }
        self.ctx.writer.shutdown().await;
        self.writer_worker.join().await;
    }
}
