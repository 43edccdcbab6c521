// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use jtag_core::{Envelope, ErrorBody};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ClientError;

type ExpiryHook = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    pub default_timeout: TimeDelta,
    pub cleanup_interval: Duration,
    pub max_pending_requests: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            default_timeout: TimeDelta::seconds(30),
            cleanup_interval: Duration::from_secs(1),
            max_pending_requests: 1000,
        }
    }
}

/// One in-flight request's caller-side bookkeeping: a Correlation Record.
/// Exactly one of resolve/reject/timeout/cancel ever fires, each consuming
/// `sender`.
///
/// Grounded on `examples/airsstack-airsstack/crates/airs-mcp/src/
/// correlation/types.rs`'s `PendingRequest` (oneshot sender + `created_at`/
/// `timeout` pair, `is_expired`/`time_remaining`), adapted from numeric
/// JSON-RPC request IDs to JTAG's string `message_id`s.
struct PendingRequest {
    sender: oneshot::Sender<Result<serde_json::Value, ClientError>>,
    created_at: DateTime<Utc>,
    timeout: TimeDelta,
}

impl PendingRequest {
    fn is_expired_at(&self, now: &DateTime<Utc>) -> bool {
        *now - self.created_at > self.timeout
    }
}

/// Manages every request this client has sent and not yet resolved.
/// Grounded on `airs-mcp::correlation::manager::CorrelationManager`: a
/// `DashMap`-backed table plus a background sweep task, generalized from
/// JSON-RPC's numeric ids to JTAG's `message_id` strings.
pub struct CorrelationManager {
    requests: Arc<DashMap<String, PendingRequest>>,
    config: CorrelationConfig,
    shutdown_signal: Arc<AtomicBool>,
    cleanup_task: Mutex<Option<JoinHandle<()>>>,
    on_expire: Arc<RwLock<Option<ExpiryHook>>>,
}

impl CorrelationManager {
    pub fn new(config: CorrelationConfig) -> Arc<Self> {
        let manager = Arc::new(Self {
            requests: Arc::new(DashMap::new()),
            config,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
            cleanup_task: Mutex::new(None),
            on_expire: Arc::new(RwLock::new(None)),
        });
        manager.clone().start_cleanup_task();
        manager
    }

    /// Installs the hook called with a request's `message_id` the moment
    /// this manager times it out, so a transport can drop its own
    /// resend-on-reconnect copy instead of retrying a request the caller
    /// has already given up on.
    pub fn set_on_expire<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.on_expire.write() {
            *guard = Some(Box::new(hook));
        }
    }

    fn start_cleanup_task(self: Arc<Self>) {
        let requests = self.requests.clone();
        let interval = self.config.cleanup_interval;
        let shutdown_signal = self.shutdown_signal.clone();
        let on_expire = self.on_expire.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if shutdown_signal.load(Ordering::SeqCst) {
                    return;
                }
                let now = Utc::now();
                let expired: Vec<String> = requests
                    .iter()
                    .filter(|entry| entry.value().is_expired_at(&now))
                    .map(|entry| entry.key().clone())
                    .collect();
                for message_id in expired {
                    if let Some((_, pending)) = requests.remove(&message_id) {
                        debug!(message_id, "request expired");
                        let _ = pending.sender.send(Err(ClientError::Timeout));
                        if let Ok(guard) = on_expire.read() {
                            if let Some(hook) = guard.as_ref() {
                                hook(&message_id);
                            }
                        }
                    }
                }
            }
        });
        // Fire-and-forget: stored so `shutdown` can await it.
        if let Ok(mut guard) = self.cleanup_task.try_lock() {
            *guard = Some(handle);
        }
    }

    /// Registers a request the caller is about to send, returning the
    /// receiver half it should await. Must be called before the envelope
    /// goes out, so a response racing ahead of registration is impossible.
    ///
    /// Keyed by the request's own `message_id`: requests never carry a
    /// `correlation_id` (only responses do, and a response's
    /// `correlation_id` always echoes the request's `message_id`).
    pub fn register(&self, envelope: &Envelope) -> Result<oneshot::Receiver<Result<serde_json::Value, ClientError>>, ClientError> {
        if self.requests.len() >= self.config.max_pending_requests {
            return Err(ClientError::TooManyPendingRequests);
        }
        let (tx, rx) = oneshot::channel();
        self.requests.insert(
            envelope.message_id.clone(),
            PendingRequest {
                sender: tx,
                created_at: Utc::now(),
                timeout: self.config.default_timeout,
            },
        );
        Ok(rx)
    }

    /// Resolves a pending request with the server's reply. Returns `false`
    /// if no such request was pending (already timed out, already
    /// resolved, or never registered) — an orphan response, not an error.
    pub fn correlate_response(&self, correlation_id: &str, result: Result<serde_json::Value, ErrorBody>) -> bool {
        match self.requests.remove(correlation_id) {
            Some((_, pending)) => {
                let mapped = result.map_err(ClientError::from);
                let _ = pending.sender.send(mapped);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&self, correlation_id: &str) {
        if let Some((_, pending)) = self.requests.remove(correlation_id) {
            let _ = pending.sender.send(Err(ClientError::Cancelled));
        }
    }

    pub fn pending_count(&self) -> usize {
        self.requests.len()
    }

    /// Fails every still-pending request with `ClientShutdown` and stops
    /// the cleanup task. Called by `Client::disconnect` after its grace
    /// period elapses.
    pub async fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.cleanup_task.lock().await.take() {
            handle.abort();
        }
        let ids: Vec<String> = self.requests.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, pending)) = self.requests.remove(&id) {
                let _ = pending.sender.send(Err(ClientError::ClientShutdown));
            }
        }
    }
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;
