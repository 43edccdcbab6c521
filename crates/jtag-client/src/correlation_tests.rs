// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jtag_core::{Context, Endpoint, Environment, Priority, Target};
use serde_json::json;

fn request_envelope(message_id: &str) -> Envelope {
    let mut envelope = Envelope::request(
        Endpoint::parse("files/read").unwrap(),
        Context::new("client-1", Environment::Remote),
        Target::Any,
        json!({}),
        Priority::Normal,
        0,
    )
    .unwrap();
    envelope.message_id = message_id.to_string();
    envelope
}

#[tokio::test]
async fn resolves_registered_request_on_matching_response() {
    let manager = CorrelationManager::new(CorrelationConfig::default());
    let envelope = request_envelope("c1");
    let rx = manager.register(&envelope).unwrap();

    assert!(manager.correlate_response("c1", Ok(json!({"ok": true}))));
    let result = rx.await.unwrap().unwrap();
    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn unknown_correlation_id_is_reported_as_orphan() {
    let manager = CorrelationManager::new(CorrelationConfig::default());
    assert!(!manager.correlate_response("does-not-exist", Ok(json!(null))));
}

#[tokio::test]
async fn expired_request_resolves_with_timeout() {
    let mut config = CorrelationConfig::default();
    config.default_timeout = TimeDelta::milliseconds(10);
    config.cleanup_interval = Duration::from_millis(5);
    let manager = CorrelationManager::new(config);
    let envelope = request_envelope("c2");
    let rx = manager.register(&envelope).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    assert!(matches!(result, Err(ClientError::Timeout)));
}

#[tokio::test]
async fn cancel_resolves_with_cancelled() {
    let manager = CorrelationManager::new(CorrelationConfig::default());
    let envelope = request_envelope("c3");
    let rx = manager.register(&envelope).unwrap();
    manager.cancel("c3");
    assert!(matches!(rx.await.unwrap(), Err(ClientError::Cancelled)));
}

#[tokio::test]
async fn expired_request_fires_the_on_expire_hook() {
    let mut config = CorrelationConfig::default();
    config.default_timeout = TimeDelta::milliseconds(10);
    config.cleanup_interval = Duration::from_millis(5);
    let manager = CorrelationManager::new(config);
    let expired_ids: Arc<std::sync::Mutex<Vec<String>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = expired_ids.clone();
    manager.set_on_expire(move |message_id| recorder.lock().unwrap().push(message_id.to_string()));
    let rx = manager.register(&request_envelope("c6")).unwrap();

    let _ = tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    assert_eq!(expired_ids.lock().unwrap().as_slice(), ["c6"]);
}

#[tokio::test]
async fn shutdown_fails_every_pending_request() {
    let manager = CorrelationManager::new(CorrelationConfig::default());
    let rx1 = manager.register(&request_envelope("c4")).unwrap();
    let rx2 = manager.register(&request_envelope("c5")).unwrap();
    manager.shutdown().await;
    assert!(matches!(rx1.await.unwrap(), Err(ClientError::ClientShutdown)));
    assert!(matches!(rx2.await.unwrap(), Err(ClientError::ClientShutdown)));
}
