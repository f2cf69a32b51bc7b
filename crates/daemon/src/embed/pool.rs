// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedder worker pool.
//!
//! A bounded set of worker tasks shares one job channel. Jobs are
//! fire-and-forget: the submitting path never waits and never observes a
//! failure. Embedding rows are writes, so they persist through the write
//! queue like every other mutation.

use super::model::EmbeddingModel;
use crate::writer::{WriteOutcome, WriteQueue};
use ctx_storage::Store;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

enum PoolMessage {
    Job { chunk_ids: Vec<i64> },
    Shutdown,
}

/// Cloneable producer handle for embed jobs.
#[derive(Clone)]
pub struct EmbedQueue {
    tx: mpsc::UnboundedSender<PoolMessage>,
}

impl EmbedQueue {
    /// Queue a batch of chunk ids. Returns false when the pool is gone;
    /// callers treat that as a logged no-op.
    pub fn enqueue(&self, chunk_ids: Vec<i64>) -> bool {
        self.tx.send(PoolMessage::Job { chunk_ids }).is_ok()
    }
}

/// The running workers; kept by the daemon lifecycle for drain-then-stop.
pub struct EmbedPool {
    tx: mpsc::UnboundedSender<PoolMessage>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl EmbedPool {
    /// Drain queued jobs, then stop every worker.
    pub async fn shutdown(self) {
        for _ in 0..self.workers.len() {
            let _ = self.tx.send(PoolMessage::Shutdown);
        }
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Start `workers` tasks sharing one job channel.
pub fn spawn(
    model: Arc<dyn EmbeddingModel>,
    reads: Arc<Mutex<Store>>,
    writer: WriteQueue,
    workers: usize,
) -> (EmbedQueue, EmbedPool) {
    let (tx, rx) = mpsc::unbounded_channel();
    let rx = Arc::new(tokio::sync::Mutex::new(rx));

    let handles = (0..workers.max(1))
        .map(|index| {
            let model = Arc::clone(&model);
            let reads = Arc::clone(&reads);
            let writer = writer.clone();
            let rx = Arc::clone(&rx);
            tokio::spawn(worker_loop(index, model, reads, writer, rx))
        })
        .collect();

    (EmbedQueue { tx: tx.clone() }, EmbedPool { tx, workers: handles })
}

async fn worker_loop(
    index: usize,
    model: Arc<dyn EmbeddingModel>,
    reads: Arc<Mutex<Store>>,
    writer: WriteQueue,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<PoolMessage>>>,
) {
    debug!(worker = index, "embed worker started");
    loop {
        let message = { rx.lock().await.recv().await };
        match message {
            Some(PoolMessage::Job { chunk_ids }) => {
                run_job(&model, &reads, &writer, chunk_ids).await;
            }
            Some(PoolMessage::Shutdown) | None => break,
        }
    }
    debug!(worker = index, "embed worker stopped");
}

async fn run_job(
    model: &Arc<dyn EmbeddingModel>,
    reads: &Arc<Mutex<Store>>,
    writer: &WriteQueue,
    chunk_ids: Vec<i64>,
) {
    let texts = match reads.lock().chunk_texts(&chunk_ids) {
        Ok(texts) => texts,
        Err(e) => {
            warn!(error = %e, "embed job could not load chunk texts");
            return;
        }
    };
    if texts.is_empty() {
        warn!(requested = chunk_ids.len(), "no chunks found for embedding");
        return;
    }

    let (ids, contents): (Vec<i64>, Vec<String>) = texts.into_iter().unzip();
    let vectors = match model.embed(&contents) {
        Ok(vectors) => vectors,
        Err(e) => {
            warn!(error = %e, "embedding model failed; chunks stay unembedded");
            return;
        }
    };

    let rows: Vec<(i64, Vec<f32>)> = ids.into_iter().zip(vectors).collect();
    let count = rows.len();
    let result = writer
        .submit(Box::new(move |store| {
            store.store_embeddings(&rows)?;
            Ok(WriteOutcome::Unit)
        }))
        .await;

    match result {
        Ok(_) => debug!(count, "stored chunk embeddings"),
        Err(e) => warn!(error = %e, "failed to persist embeddings"),
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
