// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod connection;
pub mod handshake;
pub mod http;
pub mod queue;
pub mod ws_client;
pub mod ws_server;

pub use connection::Connection;
pub use handshake::{HandshakeFrame, HANDSHAKE_TIMEOUT};
pub use http::HttpTransport;
pub use queue::OutboundQueue;
pub use ws_client::WsClient;
pub use ws_server::{build_router, WsServerState};
