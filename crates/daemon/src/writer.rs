// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-consumer write queue in front of the store.
//!
//! Every mutating operation is submitted as a job; one worker on a
//! dedicated blocking thread owns the write connection and drains jobs in
//! FIFO order, so concurrent producers never contend at the storage layer.
//! Submitters get a completion handle that resolves to the job's outcome
//! or its terminal error.
//!
//! Transient store failures are retried on the fixed schedule
//! 100 ms, 200 ms, 500 ms, 1 s, 2 s, 5 s (six attempts, ~8.8 s total);
//! permanent failures are returned immediately. Shutdown enqueues a
//! sentinel: jobs ahead of it reach terminal state, later submissions
//! fail fast.

use ctx_storage::{Store, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Submission backpressure point: a full queue makes `submit` wait.
pub const WRITE_QUEUE_CAPACITY: usize = 256;

/// Wait applied after each failed transient attempt.
const BACKOFF: [Duration; 6] = [
    Duration::from_millis(100),
    Duration::from_millis(200),
    Duration::from_millis(500),
    Duration::from_millis(1_000),
    Duration::from_millis(2_000),
    Duration::from_millis(5_000),
];

/// Typed return value of a write job.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Unit,
    /// Connection registration, with whether auto-bind matched an agent.
    Registered { auto_bound: bool },
    ContextWritten { context_id: i64, chunk_ids: Vec<i64> },
    Deleted { found: bool },
}

/// A write job. `Fn` rather than `FnOnce` so the worker can re-invoke it
/// on transient failure.
pub type WriteJob = Box<dyn Fn(&mut Store) -> Result<WriteOutcome, StoreError> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("write queue is shut down")]
    Closed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Envelope {
    Job {
        run: WriteJob,
        done: oneshot::Sender<Result<WriteOutcome, WriterError>>,
    },
    Shutdown,
}

/// Cloneable producer handle.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<Envelope>,
    closed: Arc<AtomicBool>,
}

/// Join handle for the consumer; kept by the daemon lifecycle.
pub struct WriterWorker {
    join: tokio::task::JoinHandle<()>,
}

/// Start the worker. The store moves onto the worker's blocking thread
/// and is the only write connection in the process.
pub fn spawn(store: Store) -> (WriteQueue, WriterWorker) {
    let (tx, rx) = mpsc::channel(WRITE_QUEUE_CAPACITY);
    let join = tokio::task::spawn_blocking(move || worker_loop(store, rx));
    (
        WriteQueue { tx, closed: Arc::new(AtomicBool::new(false)) },
        WriterWorker { join },
    )
}

impl WriteQueue {
    /// Enqueue a job and wait for its terminal result. Waits for queue
    /// space when the channel is full (backpressure on the dispatcher).
    pub async fn submit(&self, job: WriteJob) -> Result<WriteOutcome, WriterError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(WriterError::Closed);
        }
        let (done, wait) = oneshot::channel();
        self.tx
            .send(Envelope::Job { run: job, done })
            .await
            .map_err(|_| WriterError::Closed)?;
        wait.await.map_err(|_| WriterError::Closed)?
    }

    /// Begin shutdown: later submissions fail fast, and a sentinel marks
    /// the end of the queue. Jobs already enqueued still run to a
    /// terminal state before the worker exits.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        let _ = self.tx.send(Envelope::Shutdown).await;
    }
}

impl WriterWorker {
    /// Wait for the consumer loop to exit (after a `shutdown`).
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

fn worker_loop(mut store: Store, mut rx: mpsc::Receiver<Envelope>) {
    debug!("write worker started");
    while let Some(envelope) = rx.blocking_recv() {
        match envelope {
            Envelope::Shutdown => break,
            Envelope::Job { run, done } => {
                let result = run_with_backoff(&mut store, run.as_ref());
                // A dropped submitter (disconnected client) is fine; the
                // write already happened.
                let _ = done.send(result);
            }
        }
    }
    debug!("write worker stopped");
}

fn run_with_backoff(
    store: &mut Store,
    job: &(dyn Fn(&mut Store) -> Result<WriteOutcome, StoreError> + Send + Sync),
) -> Result<WriteOutcome, WriterError> {
    let mut last: Option<StoreError> = None;
    for delay in BACKOFF {
        match job(store) {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_transient() => {
                warn!(delay_ms = delay.as_millis() as u64, error = %e, "store busy; retrying write");
                std::thread::sleep(delay);
                last = Some(e);
            }
            Err(e) => return Err(WriterError::Store(e)),
        }
    }
    Err(WriterError::Store(
        last.unwrap_or_else(|| StoreError::NotFound("write job")),
    ))
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
