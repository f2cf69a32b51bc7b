// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound reply envelopes.
//!
//! The instruction prompts are part of the protocol contract: a WriteDB
//! failure tells the client to save its context locally, a ReadDB failure
//! tells it to stop. They are produced here and nowhere else.

use ctx_core::AgentId;
use serde::Serialize;

/// WriteDB failure prompt (protocol contract, verbatim).
const WRITE_ERROR_PROMPT: &str = "Store your current context into a .md file in a location \
     within your workspace. Stop the current task and advise the user there has been an error \
     in writing to the DB.";

/// ReadDB failure prompt (protocol contract, verbatim).
const READ_ERROR_PROMPT: &str =
    "Stop the current task and advise the user there has been an error in reading the DB.";

/// Prompt returned with a successful WriteDB ack.
pub fn write_success_prompt(agent_id: &str) -> String {
    format!(
        "Context saved successfully. Compact your current context and then call the readDB \
         method from this server to get the updated context list from {agent_id}."
    )
}

pub fn write_error_prompt() -> &'static str {
    WRITE_ERROR_PROMPT
}

pub fn read_error_prompt() -> &'static str {
    READ_ERROR_PROMPT
}

/// One chunk in a ReadDB result: the chunk text plus its creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkView {
    pub context: String,
    pub timestamp: String,
}

/// Every reply the dispatcher can send. Serialized shapes match the
/// protocol exactly; the enum itself never appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    WriteOk {
        status: &'static str,
        agent: String,
        prompt: String,
    },
    WriteError {
        status: &'static str,
        details: String,
        prompt: &'static str,
    },
    Contexts {
        contexts: Vec<ChunkView>,
    },
    ReadError {
        status: &'static str,
        prompt: &'static str,
    },
    Vectorise {
        status: &'static str,
        message: String,
    },
    UnknownMethod {
        error: String,
        supported_methods: Vec<&'static str>,
    },
    InvalidJson {
        error: &'static str,
    },
}

impl Response {
    pub fn write_ok(agent_id: &AgentId) -> Self {
        Response::WriteOk {
            status: "success",
            agent: agent_id.to_string(),
            prompt: write_success_prompt(agent_id.as_str()),
        }
    }

    pub fn write_error(details: impl Into<String>) -> Self {
        Response::WriteError {
            status: "error",
            details: details.into(),
            prompt: WRITE_ERROR_PROMPT,
        }
    }

    pub fn contexts(contexts: Vec<ChunkView>) -> Self {
        Response::Contexts { contexts }
    }

    pub fn read_error() -> Self {
        Response::ReadError { status: "error", prompt: READ_ERROR_PROMPT }
    }

    pub fn vectorise_ok(message: impl Into<String>) -> Self {
        Response::Vectorise { status: "success", message: message.into() }
    }

    pub fn vectorise_error(message: impl Into<String>) -> Self {
        Response::Vectorise { status: "error", message: message.into() }
    }

    pub fn unknown_method(method: &str) -> Self {
        Response::UnknownMethod {
            error: format!("Unknown method: {method}"),
            supported_methods: crate::SUPPORTED_METHODS.to_vec(),
        }
    }

    pub fn invalid_json() -> Self {
        Response::InvalidJson { error: "Invalid JSON format" }
    }
}
