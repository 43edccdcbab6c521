// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jtag_core::{BoxFuture, CommandHandler, Context, Endpoint, Envelope, Environment, ErrorBody, Priority, Router, RouterConfig, Subscriber, Target};

struct CountingHandler(Arc<AtomicUsize>);

impl CommandHandler for CountingHandler {
    fn call(&self, _envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(serde_json::Value::Null) })
    }
}

#[tokio::test]
async fn an_event_fans_out_to_every_non_terminal_subscriber() {
    let router = Router::new(RouterConfig::default());
    let endpoint = Endpoint::parse("files/changed").unwrap();

    let first_calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::new(AtomicUsize::new(0));
    router.register(endpoint.clone(), Subscriber::Handler(Arc::new(CountingHandler(first_calls.clone()))), false, jtag_core::AccessLevel::Public).unwrap();
    router.register(endpoint.clone(), Subscriber::Handler(Arc::new(CountingHandler(second_calls.clone()))), false, jtag_core::AccessLevel::Public).unwrap();

    let origin = Context::new("publisher", Environment::Server);
    let event = Envelope::event(endpoint, origin, Target::Any, serde_json::json!({"path": "a.txt"}), Priority::Normal, 1000).unwrap();
    router.post(event).await.unwrap();

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_second_terminal_registration_on_the_same_endpoint_is_rejected() {
    let router = Router::new(RouterConfig::default());
    let endpoint = Endpoint::parse("files/read").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    router.register(endpoint.clone(), Subscriber::Handler(Arc::new(CountingHandler(calls.clone()))), true, jtag_core::AccessLevel::Public).unwrap();
    let second = router.register(endpoint, Subscriber::Handler(Arc::new(CountingHandler(calls))), true, jtag_core::AccessLevel::Public);

    assert!(matches!(second, Err(jtag_core::RouteError::EndpointTaken)));
}
