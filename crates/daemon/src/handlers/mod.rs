// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol front-end: parse a frame, authorize, route, answer.
//!
//! Every handler converts its failures into the canonical envelope before
//! the next frame on that socket is read; nothing here panics or leaks a
//! stack trace to the wire.

mod read;
mod vectorise;
mod write;

use crate::allowlist::Allowlist;
use crate::embed::EmbedQueue;
use crate::registry::ConnectionRegistry;
use crate::writer::WriteQueue;
use ctx_core::ConnectionId;
use ctx_storage::Store;
use ctx_wire::{parse_frame, FrameError, Request, Response};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared daemon context for all request handlers.
pub struct DaemonCtx {
    pub registry: ConnectionRegistry,
    pub writer: WriteQueue,
    /// Shared read connection. Mutations never go through here.
    pub reads: Arc<Mutex<Store>>,
    /// Absent when embeddings are disabled; the write path then simply
    /// omits the enqueue.
    pub embedder: Option<EmbedQueue>,
    pub allowlist: Allowlist,
}

/// Handle one inbound text frame for `connection_id`.
pub async fn dispatch(ctx: &DaemonCtx, connection_id: &ConnectionId, text: &str) -> Response {
    match parse_frame(text) {
        Ok(Request::WriteDb(params)) => write::handle(ctx, connection_id, params).await,
        Ok(Request::ReadDb(params)) => read::handle(ctx, connection_id, params).await,
        Ok(Request::VectoriseChunks(params)) => vectorise::handle(ctx, params),
        Err(FrameError::InvalidJson) => Response::invalid_json(),
        Err(FrameError::UnknownMethod(method)) => Response::unknown_method(&method),
        Err(FrameError::BadParams { method, .. }) => match method {
            "WriteDB" => Response::write_error("Both agent_id and context parameters required"),
            "ReadDB" => Response::read_error(),
            _ => Response::vectorise_error("chunk_ids must be a list of integers"),
        },
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
