// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jtag_core::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The first frame a WebSocket client must send, before any envelope.
/// Gates every other message the way `examples/groblegark-coop/crates/
/// cli/src/transport/ws.rs` gates on an `Auth` client message; here the
/// handshake *is* the peer's identity, not a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandshakeFrame {
    SessionHandshake {
        session_id: String,
        context: Context,
    },
}

/// A connection that doesn't handshake within this window is closed with
/// `ErrorCode::HandshakeTimeout`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
