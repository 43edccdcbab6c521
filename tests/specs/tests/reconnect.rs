// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use jtag_core::{Context, Environment};
use jtag_specs::FabricServer;
use jtag_transport::{HandshakeFrame, WsClient};
use serial_test::serial;

async fn wait_until(mut check: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
#[serial]
async fn disconnect_stops_the_reconnect_loop() {
    let server = FabricServer::start().await.unwrap();
    let handshake = HandshakeFrame::SessionHandshake {
        session_id: "reconnect-session".to_string(),
        context: Context::new("reconnect-client", Environment::Remote),
    };
    let (client, _inbound) = WsClient::connect(server.ws_url(), handshake, 64);

    assert!(wait_until(|| client.is_connected(), Duration::from_secs(2)).await, "client never connected");

    client.disconnect();
    assert!(wait_until(|| !client.is_connected(), Duration::from_secs(2)).await, "client stayed connected after disconnect");

    // The reconnect loop must not spin back up after an explicit disconnect.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!client.is_connected());

    server.shutdown().await;
}

#[tokio::test]
async fn an_unreachable_server_leaves_the_client_disconnected_without_panicking() {
    let handshake = HandshakeFrame::SessionHandshake {
        session_id: "unreachable-session".to_string(),
        context: Context::new("reconnect-client", Environment::Remote),
    };
    let (client, _inbound) = WsClient::connect("ws://127.0.0.1:1/ws", handshake, 64);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!client.is_connected());

    client.disconnect();
}
