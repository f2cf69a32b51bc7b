// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol vocabulary for the context broker.
//!
//! One socket message is one JSON object. Inbound frames carry
//! `{ "method": <string>, "params": <object> }`; every request gets exactly
//! one JSON reply. Server-initiated broadcast frames are tagged with a
//! `"type"` field.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod event;
mod request;
mod response;

pub use event::{AgentWireStatus, BroadcastEvent};
pub use request::{
    parse_frame, FrameError, ReadParams, Request, VectoriseParams, WriteParams, SUPPORTED_METHODS,
};
pub use response::{
    read_error_prompt, write_error_prompt, write_success_prompt, ChunkView, Response,
};
