// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-initiated broadcast frames.
//!
//! Delivered best-effort to every live socket. Serialized with a `"type"`
//! tag in snake_case, e.g. `{"type": "agent_status", ...}`.

use ctx_core::{AgentId, ConnectionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentWireStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastEvent {
    /// An agent's connection came up or went away.
    AgentStatus { agent_id: String, status: AgentWireStatus },

    /// A socket registered with an id no agent row matches; the connection
    /// is parked as `pending` until an operator assigns it.
    NewPendingAgent { agent_id: String, connection_id: String },

    /// Allowlist refusal; the socket is closed right after this frame.
    AnnounceRejected { agent_id: String, reason: String },
}

impl BroadcastEvent {
    pub fn connected(agent_id: &AgentId) -> Self {
        BroadcastEvent::AgentStatus {
            agent_id: agent_id.to_string(),
            status: AgentWireStatus::Connected,
        }
    }

    pub fn disconnected(agent_id: &AgentId) -> Self {
        BroadcastEvent::AgentStatus {
            agent_id: agent_id.to_string(),
            status: AgentWireStatus::Disconnected,
        }
    }

    /// A pending connection proposes its own id as the agent id.
    pub fn pending(connection_id: &ConnectionId) -> Self {
        BroadcastEvent::NewPendingAgent {
            agent_id: connection_id.to_string(),
            connection_id: connection_id.to_string(),
        }
    }

    pub fn rejected(agent_id: &ConnectionId) -> Self {
        BroadcastEvent::AnnounceRejected {
            agent_id: agent_id.to_string(),
            reason: "not_allowlisted".to_string(),
        }
    }
}
