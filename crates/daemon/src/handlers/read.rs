// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ReadDB: resolve the requester's scope and return the most recent
//! visible chunks.
//!
//! The identity rule is the conservative one: `agent_id` must equal the
//! agent bound to this connection, regardless of permission level.

use super::DaemonCtx;
use crate::{permissions, reads};
use ctx_core::{ConnectionId, PermissionLevel};
use ctx_wire::{ReadParams, Response};
use tracing::{debug, warn};

pub(crate) async fn handle(
    ctx: &DaemonCtx,
    connection_id: &ConnectionId,
    params: ReadParams,
) -> Response {
    if params.agent_id.is_empty() {
        return Response::read_error();
    }

    let Some(bound) = ctx.registry.agent_for(connection_id) else {
        return Response::read_error();
    };
    if bound.as_str() != params.agent_id {
        return Response::read_error();
    }

    let requested = match params.permission_level.as_deref() {
        None => None,
        Some(token) => match token.parse::<PermissionLevel>() {
            Ok(level) => Some(level),
            Err(e) => {
                debug!(agent = %bound, %e, "rejected ReadDB override");
                return Response::read_error();
            }
        },
    };

    let profile = match ctx.reads.lock().agent_profile(&bound) {
        Ok(Some(profile)) => profile,
        Ok(None) => return Response::read_error(),
        Err(e) => {
            warn!(agent = %bound, error = %e, "failed to load agent profile");
            return Response::read_error();
        }
    };

    let predicate = match permissions::resolve(&profile, requested, params.since.as_deref()) {
        Ok(predicate) => predicate,
        Err(e) => {
            debug!(agent = %bound, %e, "ReadDB not resolvable");
            return Response::read_error();
        }
    };

    match reads::latest_chunks(&ctx.reads.lock(), &predicate) {
        Ok(views) => Response::contexts(views),
        Err(e) => {
            warn!(agent = %bound, error = %e, "ReadDB query failed");
            Response::read_error()
        }
    }
}
