// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound frame parsing.
//!
//! Parsing happens in two stages: first the `{method, params}` envelope,
//! then the per-method parameter shape. This keeps protocol-level failures
//! (bad JSON, unknown method, malformed params) distinct so the dispatcher
//! can answer each with the envelope the protocol promises, instead of a
//! generic serde error.

use serde::Deserialize;

/// Method names accepted over the socket, in the order they are reported
/// by the unknown-method reply.
pub const SUPPORTED_METHODS: [&str; 3] = ["ReadDB", "WriteDB", "VectoriseChunks"];

/// Raw frame envelope before method dispatch.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: serde_json::Value,
}

/// `WriteDB` parameters. Fields default to empty so that a missing field
/// surfaces as the protocol's own validation error, not a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WriteParams {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub context: String,
}

/// `ReadDB` parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadParams {
    #[serde(default)]
    pub agent_id: String,
    /// Only chunks strictly newer than this timestamp are returned.
    #[serde(default)]
    pub since: Option<String>,
    /// Requested permission override; never widens the configured level.
    #[serde(default)]
    pub permission_level: Option<String>,
}

/// `VectoriseChunks` parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VectoriseParams {
    #[serde(default)]
    pub chunk_ids: Vec<i64>,
}

/// A parsed inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    WriteDb(WriteParams),
    ReadDb(ReadParams),
    VectoriseChunks(VectoriseParams),
}

/// Why a frame could not be turned into a [`Request`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("invalid JSON frame")]
    InvalidJson,

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The method was recognized but its params had the wrong shape
    /// (e.g. `chunk_ids` holding strings).
    #[error("malformed params for {method}: {detail}")]
    BadParams { method: &'static str, detail: String },
}

/// Parse one text frame into a request.
pub fn parse_frame(text: &str) -> Result<Request, FrameError> {
    let frame: Frame = serde_json::from_str(text).map_err(|_| FrameError::InvalidJson)?;
    let method = frame.method.unwrap_or_default();

    match method.as_str() {
        "WriteDB" => params(frame.params, "WriteDB").map(Request::WriteDb),
        "ReadDB" => params(frame.params, "ReadDB").map(Request::ReadDb),
        "VectoriseChunks" => params(frame.params, "VectoriseChunks").map(Request::VectoriseChunks),
        _ => Err(FrameError::UnknownMethod(method)),
    }
}

fn params<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    method: &'static str,
) -> Result<T, FrameError> {
    // An absent params object behaves like `{}` so field-level validation
    // stays in the handlers.
    let value = if value.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        value
    };
    serde_json::from_value(value)
        .map_err(|e| FrameError::BadParams { method, detail: e.to_string() })
}
