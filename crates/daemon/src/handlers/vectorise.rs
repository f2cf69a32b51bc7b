// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VectoriseChunks: force an embed job for the given chunk ids.
//!
//! Administrative; acks after enqueue without waiting for completion.

use super::DaemonCtx;
use ctx_wire::{Response, VectoriseParams};

pub(crate) fn handle(ctx: &DaemonCtx, params: VectoriseParams) -> Response {
    if params.chunk_ids.is_empty() {
        return Response::vectorise_error("chunk_ids parameter required");
    }

    match &ctx.embedder {
        None => Response::vectorise_ok("Embeddings are disabled; nothing queued"),
        Some(queue) => {
            let count = params.chunk_ids.len();
            if queue.enqueue(params.chunk_ids) {
                Response::vectorise_ok(format!("Queued {count} chunks for embedding"))
            } else {
                Response::vectorise_error("Embedding workers are not running")
            }
        }
    }
}
