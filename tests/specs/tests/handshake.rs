// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use futures_util::{SinkExt, StreamExt};
use jtag_client::{Client, ConnectOptions};
use jtag_core::{Context, Environment};
use jtag_specs::FabricServer;
use serial_test::serial;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
#[serial]
async fn a_connection_whose_first_frame_is_not_a_handshake_is_closed() {
    let server = FabricServer::start().await.unwrap();

    let (mut socket, _) = tokio_tungstenite::connect_async(server.ws_url()).await.unwrap();
    socket.send(Message::Text(r#"{"not": "a handshake"}"#.into())).await.unwrap();

    let next = socket.next().await;
    assert!(next.is_none() || matches!(next, Some(Ok(Message::Close(_)))));

    server.shutdown().await;
}

#[tokio::test]
#[serial]
async fn a_proper_handshake_followed_by_a_request_gets_a_response() {
    let server = FabricServer::start().await.unwrap();

    let context = Context::new("handshake-client", Environment::Remote);
    let options = ConnectOptions::new(server.ws_url(), context, "handshake-session");
    let client = Client::connect(options).await.unwrap();

    let result = client.invoke("system/status", serde_json::json!({})).await.unwrap();
    assert_eq!(result["state"], "Running");

    client.disconnect().await;
    server.shutdown().await;
}
