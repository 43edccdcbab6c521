// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jtag_core::{AccessLevel, BoxFuture, CommandHandler, Context, Endpoint, Environment, ErrorBody, Priority, RouterConfig, Subscriber, Target};
use serde_json::json;
use std::sync::Arc;

use crate::ws_server::{build_router, WsServerState};

struct Echo;
impl CommandHandler for Echo {
    fn call(&self, envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        Box::pin(async move { Ok(envelope.payload) })
    }
}

async fn spawn_server() -> (String, tokio::task::JoinHandle<()>) {
    let router = jtag_core::Router::new(RouterConfig::default());
    router
        .register(Endpoint::parse("files/read").unwrap(), Subscriber::Handler(Arc::new(Echo)), true, AccessLevel::Public)
        .unwrap();
    let state = WsServerState::new(router, 16);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), handle)
}

#[tokio::test]
async fn http_transport_round_trips_a_request_over_the_network() {
    let (base_url, server) = spawn_server().await;
    let transport = HttpTransport::new(base_url);

    let request = Envelope::request(
        Endpoint::parse("files/read").unwrap(),
        Context::new("caller-1", Environment::Remote),
        Target::Any,
        json!({"path": "a.txt"}),
        Priority::Normal,
        1,
    )
    .unwrap();

    let response = transport.send_envelope(&request).await.unwrap();
    assert_eq!(response.correlation_id.as_deref(), Some(request.message_id.as_str()));
    assert_eq!(response.payload, json!({"path": "a.txt"}));
    server.abort();
}
