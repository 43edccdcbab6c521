// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use jtag_core::{BoxFuture, Context, Envelope, OutboundHandle, RouteError};
use tokio::sync::Mutex;
use tracing::debug;

use crate::queue::OutboundQueue;

/// One peer's half of the fabric: its identity, its bounded outbound
/// mailbox, and liveness bookkeeping. Implements [`OutboundHandle`] so the
/// router can address it without knowing whether the peer is a WebSocket
/// server connection or a WebSocket client.
///
/// Grounded on `examples/groblegark-coop/crates/mux/src/state.rs`'s
/// `SessionEntry`: cached peer metadata plus a failure counter, minus the
/// PTY-specific cached screen/status fields this fabric has no use for.
pub struct Connection {
    pub id: String,
    pub peer: Context,
    pub session_id: String,
    queue: OutboundQueue,
    last_seen: Mutex<Instant>,
    reconnect_count: AtomicU32,
}

impl Connection {
    pub fn new(id: impl Into<String>, peer: Context, session_id: impl Into<String>, queue_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            peer,
            session_id: session_id.into(),
            queue: OutboundQueue::new(queue_capacity),
            last_seen: Mutex::new(Instant::now()),
            reconnect_count: AtomicU32::new(0),
        })
    }

    pub async fn touch(&self) {
        *self.last_seen.lock().await = Instant::now();
    }

    pub async fn last_seen(&self) -> Instant {
        *self.last_seen.lock().await
    }

    pub fn record_reconnect(&self) {
        let count = self.reconnect_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(connection_id = %self.id, reconnect_count = count, "connection reconnected");
    }

    pub fn reconnect_count(&self) -> u32 {
        self.reconnect_count.load(Ordering::SeqCst)
    }

    /// Pulls the next outbound envelope, blocking until one is available.
    /// Called by the transport's writer task, never by the router.
    pub async fn next_outbound(&self) -> Envelope {
        self.queue.pop().await
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.len().await
    }
}

impl OutboundHandle for Connection {
    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<(), RouteError>> {
        Box::pin(async move { self.queue.push(envelope).await })
    }

    fn queue_depth(&self) -> usize {
        self.queue.len_hint()
    }
}
