// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jtag_client::{Client, ConnectOptions};
use jtag_core::{Context, Environment};
use jtag_specs::FabricServer;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn invoke_reaches_a_builtin_command_and_returns_its_result() {
    let server = FabricServer::start().await.unwrap();

    let context = Context::new("spec-client", Environment::Remote);
    let options = ConnectOptions::new(server.ws_url(), context, "happy-path");
    let client = Client::connect(options).await.unwrap();

    let result = client.invoke("system/status", serde_json::json!({})).await.unwrap();
    assert_eq!(result["state"], "Running");
    assert!(result["endpoints"].as_array().unwrap().iter().any(|e| e["endpoint"] == "system/status"));

    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
#[serial]
async fn list_enumerates_every_registered_endpoint() {
    let server = FabricServer::start().await.unwrap();

    let context = Context::new("spec-client", Environment::Remote);
    let options = ConnectOptions::new(server.ws_url(), context, "happy-path-list");
    let client = Client::connect(options).await.unwrap();

    let result = client.invoke("list", serde_json::json!({})).await.unwrap();
    let endpoints = result["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e["endpoint"] == "list"));
    assert!(endpoints.iter().any(|e| e["endpoint"] == "system/status"));

    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
#[serial]
async fn unknown_endpoint_surfaces_no_handler_error() {
    let server = FabricServer::start().await.unwrap();

    let context = Context::new("spec-client", Environment::Remote);
    let options = ConnectOptions::new(server.ws_url(), context, "happy-path-error");
    let client = Client::connect(options).await.unwrap();

    let err = client.invoke("nothing/here", serde_json::json!({})).await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("no handler") || err.to_string().to_lowercase().contains("remote"));

    client.disconnect().await;
    server.shutdown().await;
}
