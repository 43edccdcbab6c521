// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jtag_core::{Context, Endpoint, Envelope, Environment, OutboundHandle, Priority, Target};
use jtag_transport::Connection;

fn event(priority: Priority, tag: &str) -> Envelope {
    let origin = Context::new("backpressure-test", Environment::Remote);
    let endpoint = Endpoint::parse("files/changed").unwrap();
    Envelope::event(endpoint, origin, Target::Any, serde_json::json!({"tag": tag}), priority, 1000).unwrap()
}

#[tokio::test]
async fn a_full_queue_evicts_the_oldest_lowest_priority_entry_for_a_higher_priority_push() {
    let connection = Connection::new("conn-1", Context::new("peer", Environment::Remote), "session", 2);

    connection.send(event(Priority::Low, "first")).await.unwrap();
    connection.send(event(Priority::Normal, "second")).await.unwrap();
    // Queue is full at capacity 2; "first" (Low) should be evicted for this High push.
    connection.send(event(Priority::High, "third")).await.unwrap();

    let remaining = vec![connection.next_outbound().await, connection.next_outbound().await];
    let tags: Vec<_> = remaining.iter().map(|e| e.payload["tag"].as_str().unwrap().to_string()).collect();
    assert_eq!(tags, vec!["second", "third"]);
}

#[tokio::test]
async fn a_full_queue_of_only_higher_priority_entries_rejects_a_lower_priority_push() {
    let connection = Connection::new("conn-2", Context::new("peer", Environment::Remote), "session", 1);

    connection.send(event(Priority::High, "only")).await.unwrap();
    let result = connection.send(event(Priority::Low, "rejected")).await;

    assert!(matches!(result, Err(jtag_core::RouteError::QueueFull)));
}
