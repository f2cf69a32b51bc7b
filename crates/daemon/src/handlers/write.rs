// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WriteDB: chunk the blob, persist parent + chunks atomically, ack, then
//! fire the embed job.

use super::DaemonCtx;
use crate::writer::WriteOutcome;
use ctx_core::{chunk_text, ConnectionId};
use ctx_wire::{Response, WriteParams};
use tracing::{error, warn};

pub(crate) async fn handle(
    ctx: &DaemonCtx,
    connection_id: &ConnectionId,
    params: WriteParams,
) -> Response {
    if params.agent_id.is_empty() || params.context.is_empty() {
        return Response::write_error("Both agent_id and context parameters required");
    }

    let Some(bound) = ctx.registry.agent_for(connection_id) else {
        return Response::write_error("Connection not assigned to any agent");
    };

    // An agent may write contexts only for itself.
    if bound.as_str() != params.agent_id {
        return Response::write_error("Agent can only write contexts for itself");
    }

    let profile = match ctx.reads.lock().agent_profile(&bound) {
        Ok(Some(profile)) => profile,
        Ok(None) => return Response::write_error("Agent not found"),
        Err(e) => {
            warn!(agent = %bound, error = %e, "failed to load agent profile");
            return Response::write_error("Failed to load agent");
        }
    };
    let (Some(session_id), Some(project_id)) = (profile.session_id, profile.project_id) else {
        return Response::write_error("Agent is not attached to a session");
    };

    let chunks = chunk_text(&params.context);
    if chunks.is_empty() {
        return Response::write_error("Context is empty");
    }

    let agent = bound.clone();
    let outcome = ctx
        .writer
        .submit(Box::new(move |store| {
            let (context_id, chunk_ids) =
                store.insert_context(&agent, session_id, project_id, &chunks)?;
            Ok(WriteOutcome::ContextWritten { context_id, chunk_ids })
        }))
        .await;

    match outcome {
        Ok(WriteOutcome::ContextWritten { chunk_ids, .. }) => {
            if let Some(embedder) = &ctx.embedder {
                if !embedder.enqueue(chunk_ids) {
                    warn!("embed pool unavailable; chunks stay unembedded");
                }
            }
            Response::write_ok(&bound)
        }
        Ok(_) => {
            error!("write job returned an unexpected outcome");
            Response::write_error("Internal error")
        }
        Err(e) => {
            warn!(agent = %bound, error = %e, "WriteDB failed");
            Response::write_error(e.to_string())
        }
    }
}
