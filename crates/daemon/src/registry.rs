// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process registry of live sockets and their bound agents.
//!
//! One lock guards the map; frames for one socket go through that
//! socket's outbound channel, whose single sender task owns wire order.
//! Broadcast fan-out is best-effort: a dead socket never aborts the loop.

use ctx_core::{AgentId, ConnectionId};
use ctx_wire::BroadcastEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Sender half of a socket's outbound queue. Frames are pre-serialized
/// JSON text.
pub type OutboundTx = mpsc::UnboundedSender<String>;

struct ConnectionHandle {
    sender: OutboundTx,
    agent: Option<AgentId>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted socket. A reconnect with the same id
    /// replaces the stale handle.
    pub fn attach(&self, connection_id: &ConnectionId, sender: OutboundTx) {
        self.inner
            .lock()
            .insert(connection_id.clone(), ConnectionHandle { sender, agent: None });
    }

    /// Drop a socket's handle, returning the agent that was bound to it.
    pub fn detach(&self, connection_id: &ConnectionId) -> Option<AgentId> {
        self.inner
            .lock()
            .remove(connection_id.as_str())
            .and_then(|handle| handle.agent)
    }

    /// Record the in-memory half of the 1:1 binding. Returns false when
    /// the socket is no longer attached.
    pub fn bind(&self, connection_id: &ConnectionId, agent_id: &AgentId) -> bool {
        match self.inner.lock().get_mut(connection_id.as_str()) {
            Some(handle) => {
                handle.agent = Some(agent_id.clone());
                true
            }
            None => false,
        }
    }

    pub fn agent_for(&self, connection_id: &ConnectionId) -> Option<AgentId> {
        self.inner
            .lock()
            .get(connection_id.as_str())
            .and_then(|handle| handle.agent.clone())
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Queue a frame for one socket. Returns false when the socket is gone.
    pub fn send_to(&self, connection_id: &ConnectionId, frame: String) -> bool {
        match self.inner.lock().get(connection_id.as_str()) {
            Some(handle) => handle.sender.send(frame).is_ok(),
            None => false,
        }
    }

    /// Fan a broadcast event out to every live socket, best-effort.
    pub fn broadcast(&self, event: &BroadcastEvent) {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "failed to serialize broadcast event");
                return;
            }
        };
        let mut dead = 0usize;
        for handle in self.inner.lock().values() {
            if handle.sender.send(frame.clone()).is_err() {
                dead += 1;
            }
        }
        if dead > 0 {
            debug!(dead, "broadcast skipped closed sockets");
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
