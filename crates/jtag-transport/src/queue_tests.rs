// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jtag_core::{Context, Environment, Envelope, Priority, Target};
use serde_json::json;

fn envelope(id: &str, priority: Priority) -> Envelope {
    let endpoint = jtag_core::Endpoint::parse("events/tick").unwrap();
    Envelope::event(
        endpoint,
        Context::new(id, Environment::Remote),
        Target::Any,
        json!({}),
        priority,
        0,
    )
    .unwrap()
}

#[tokio::test]
async fn evicts_oldest_lowest_priority_entry_when_full() {
    let queue = OutboundQueue::new(2);
    queue.push(envelope("a", Priority::Low)).await.unwrap();
    queue.push(envelope("b", Priority::Low)).await.unwrap();
    queue.push(envelope("c", Priority::High)).await.unwrap();

    assert_eq!(queue.len().await, 2);
    let first = queue.pop().await;
    assert_eq!(first.origin.unique_id, "b");
    let second = queue.pop().await;
    assert_eq!(second.origin.unique_id, "c");
}

#[tokio::test]
async fn rejects_push_when_everything_queued_outranks_incoming() {
    let queue = OutboundQueue::new(1);
    queue.push(envelope("a", Priority::High)).await.unwrap();
    let result = queue.push(envelope("b", Priority::Low)).await;
    assert!(matches!(result, Err(jtag_core::RouteError::QueueFull)));
}

#[tokio::test]
async fn pop_is_fifo_under_capacity() {
    let queue = OutboundQueue::new(10);
    queue.push(envelope("a", Priority::Normal)).await.unwrap();
    queue.push(envelope("b", Priority::Normal)).await.unwrap();
    assert_eq!(queue.pop().await.origin.unique_id, "a");
    assert_eq!(queue.pop().await.origin.unique_id, "b");
}
