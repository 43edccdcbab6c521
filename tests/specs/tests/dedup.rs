// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jtag_core::{BoxFuture, CommandHandler, Context, Endpoint, Envelope, Environment, ErrorBody, Priority, Router, RouterConfig, Subscriber, Target};

struct CountingHandler(Arc<AtomicUsize>);

impl CommandHandler for CountingHandler {
    fn call(&self, _envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(serde_json::json!({"ok": true})) })
    }
}

#[tokio::test]
async fn retransmitted_request_is_dispatched_at_most_once() {
    let router = Router::new(RouterConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = Endpoint::parse("files/read").unwrap();
    router.register(endpoint.clone(), Subscriber::Handler(Arc::new(CountingHandler(calls.clone()))), true, jtag_core::AccessLevel::Public).unwrap();

    let origin = Context::new("retry-client", Environment::Remote);
    let envelope = Envelope::request(endpoint, origin, Target::Any, serde_json::json!({"path": "README.md"}), Priority::Normal, 1000).unwrap();

    router.post(envelope.clone()).await.unwrap();
    router.post(envelope).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn requests_with_different_payloads_both_dispatch() {
    let router = Router::new(RouterConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = Endpoint::parse("files/read").unwrap();
    router.register(endpoint.clone(), Subscriber::Handler(Arc::new(CountingHandler(calls.clone()))), true, jtag_core::AccessLevel::Public).unwrap();

    let origin = Context::new("retry-client", Environment::Remote);
    let first = Envelope::request(endpoint.clone(), origin.clone(), Target::Any, serde_json::json!({"path": "a.txt"}), Priority::Normal, 1000).unwrap();
    let second = Envelope::request(endpoint, origin, Target::Any, serde_json::json!({"path": "b.txt"}), Priority::Normal, 1000).unwrap();

    router.post(first).await.unwrap();
    router.post(second).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
