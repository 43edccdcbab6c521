// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::AccessLevel;
use crate::endpoint::Endpoint;
use crate::envelope::{Envelope, Kind, Priority, Target};
use crate::error::{ErrorBody, ErrorCode};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A local, in-process command implementation. `jtag-server`'s command
/// registry implements this for every registered endpoint.
pub trait CommandHandler: Send + Sync {
    fn call(&self, envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>>;
}

impl<F> CommandHandler for F
where
    F: Fn(Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> + Send + Sync,
{
    fn call(&self, envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        (self)(envelope)
    }
}

/// The router's only upward seam: a handle to wherever a connected peer's
/// bytes actually go. `jtag-transport` implements this for WebSocket server
/// connections, the WebSocket client, and (partially) the HTTP transport.
pub trait OutboundHandle: Send + Sync {
    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<(), RouteError>>;
    fn queue_depth(&self) -> usize;
}

#[derive(Debug, Clone)]
pub enum Subscriber {
    Handler(Arc<dyn CommandHandler>),
    Connection(String),
}

struct SubscriberEntry {
    id: u64,
    terminal: bool,
    subscriber: Subscriber,
    access_level: AccessLevel,
}

/// An endpoint and how many subscribers currently hold it, returned by
/// [`Router::enumerate`] for `list`/`system/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub endpoint: Endpoint,
    pub subscriber_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("no handler registered for endpoint")]
    NoHandler,
    #[error("request timed out")]
    Timeout,
    #[error("remote error: {0}")]
    RemoteError(ErrorBody),
    #[error("outbound queue full")]
    QueueFull,
    #[error("request was cancelled")]
    Cancelled,
    #[error("peer is not connected")]
    PeerDisconnected,
    #[error("an endpoint may have only one terminal subscriber")]
    EndpointTaken,
}

impl From<&RouteError> for ErrorCode {
    fn from(value: &RouteError) -> Self {
        match value {
            RouteError::NoHandler => ErrorCode::NoHandler,
            RouteError::Timeout => ErrorCode::Timeout,
            RouteError::RemoteError(_) => ErrorCode::RemoteError,
            RouteError::QueueFull => ErrorCode::QueueFull,
            RouteError::Cancelled => ErrorCode::Cancelled,
            RouteError::PeerDisconnected => ErrorCode::PeerDisconnected,
            RouteError::EndpointTaken => ErrorCode::EndpointTaken,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Running,
    Draining,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub dedup_window: Duration,
    pub default_queue_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_secs(2),
            default_queue_capacity: 256,
        }
    }
}

/// The fabric's dispatch hub: one per server process, shared behind an
/// `Arc` by every transport and every registered command.
///
/// Holds no lock across a handler invocation or a `send`. The subscriber
/// table and dedup set are `DashMap`s so concurrent registration, dispatch,
/// and GC never serialize on a single mutex.
pub struct Router {
    config: RouterConfig,
    subscribers: DashMap<Endpoint, Vec<SubscriberEntry>>,
    dedup: DashMap<(String, String), Instant>,
    response_cache: DashMap<(String, String), (Instant, Result<serde_json::Value, ErrorBody>)>,
    connections: DashMap<String, Arc<dyn OutboundHandle>>,
    next_id: AtomicU64,
    state: RwLock<RouterState>,
    shutdown: CancellationToken,
}

pub struct SubscriptionId {
    pub endpoint: Endpoint,
    pub id: u64,
}

impl Router {
    pub fn new(config: RouterConfig) -> Arc<Self> {
        let router = Arc::new(Self {
            config,
            subscribers: DashMap::new(),
            dedup: DashMap::new(),
            response_cache: DashMap::new(),
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
            state: RwLock::new(RouterState::Running),
            shutdown: CancellationToken::new(),
        });
        router.clone().spawn_dedup_sweeper();
        router
    }

    fn spawn_dedup_sweeper(self: Arc<Self>) {
        let window = self.config.dedup_window;
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        self.dedup.retain(|_, seen_at| now.duration_since(*seen_at) < window);
                        self.response_cache.retain(|_, (cached_at, _)| now.duration_since(*cached_at) < window);
                    }
                }
            }
        });
    }

    /// Registers a subscriber for an endpoint. At most one `terminal`
    /// subscriber may exist per endpoint at a time; registering a second
    /// one fails with [`RouteError::EndpointTaken`]. `access_level` is
    /// checked against the request's origin before a terminal handler ever
    /// runs.
    pub fn register(
        &self,
        endpoint: Endpoint,
        subscriber: Subscriber,
        terminal: bool,
        access_level: AccessLevel,
    ) -> Result<SubscriptionId, RouteError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.subscribers.entry(endpoint.clone()).or_default();
        if terminal && entries.iter().any(|e| e.terminal) {
            return Err(RouteError::EndpointTaken);
        }
        entries.push(SubscriberEntry { id, terminal, subscriber, access_level });
        Ok(SubscriptionId { endpoint, id })
    }

    pub fn unregister(&self, subscription: SubscriptionId) {
        if let Some(mut entries) = self.subscribers.get_mut(&subscription.endpoint) {
            entries.retain(|e| e.id != subscription.id);
        }
    }

    pub fn register_connection(&self, connection_id: impl Into<String>, handle: Arc<dyn OutboundHandle>) {
        self.connections.insert(connection_id.into(), handle);
    }

    pub fn unregister_connection(&self, connection_id: &str) {
        self.connections.remove(connection_id);
    }

    pub fn enumerate(&self) -> Vec<EndpointSummary> {
        self.subscribers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| EndpointSummary {
                endpoint: entry.key().clone(),
                subscriber_count: entry.value().len(),
            })
            .collect()
    }

    pub async fn state(&self) -> RouterState {
        *self.state.read().await
    }

    /// Begins the shutdown sequence: stop accepting new dispatch, let
    /// in-flight handlers finish, then mark stopped.
    pub async fn drain(&self) {
        *self.state.write().await = RouterState::Draining;
        self.shutdown.cancel();
        *self.state.write().await = RouterState::Stopped;
    }

    /// Returns `true` if this envelope has not been seen within the dedup
    /// window, marking it seen as a side effect.
    fn check_and_mark_dedup(&self, envelope: &Envelope) -> bool {
        let key = envelope.dedup_key();
        let now = Instant::now();
        match self.dedup.get(&key) {
            Some(seen_at) if now.duration_since(*seen_at) < self.config.dedup_window => false,
            _ => {
                self.dedup.insert(key, now);
                true
            }
        }
    }

    pub async fn post(&self, envelope: Envelope) -> Result<(), RouteError> {
        if self.state().await == RouterState::Stopped {
            return Err(RouteError::PeerDisconnected);
        }
        if !self.check_and_mark_dedup(&envelope) {
            return self.handle_duplicate(envelope).await;
        }
        match envelope.kind {
            Kind::Request => self.dispatch_request(envelope).await,
            Kind::Event => self.dispatch_event(envelope).await,
            Kind::Response => self.dispatch_response(envelope).await,
        }
    }

    /// A message whose hash was already seen within the dedup window.
    /// Events are simply dropped; a request instead gets the cached
    /// response for its hash replayed back to it (its own `message_id`
    /// becomes the reply's `correlationId`), so a resend after reconnect
    /// resolves instead of timing out. If no response has been cached yet
    /// for that hash — the original is still in flight, or it was
    /// forwarded to a remote peer whose reply this hop never observes —
    /// the duplicate is dropped, same as before.
    async fn handle_duplicate(&self, envelope: Envelope) -> Result<(), RouteError> {
        debug!(message_id = %envelope.message_id, "duplicate envelope");
        if envelope.kind != Kind::Request {
            return Ok(());
        }
        let Some(cached) = self.response_cache.get(&envelope.dedup_key()).map(|entry| entry.1.clone()) else {
            return Ok(());
        };
        let target = Target::Peer(envelope.origin.unique_id.clone());
        self.reply(envelope.message_id.clone(), target, envelope.created_at, cached).await
    }

    fn cache_response(&self, key: (String, String), result: Result<serde_json::Value, ErrorBody>) {
        self.response_cache.insert(key, (Instant::now(), result));
    }

    async fn dispatch_request(&self, envelope: Envelope) -> Result<(), RouteError> {
        let endpoint = envelope
            .endpoint
            .clone()
            .ok_or(RouteError::NoHandler)?;
        let terminal = self
            .subscribers
            .get(&endpoint)
            .and_then(|entries| entries.iter().find(|e| e.terminal).map(|e| (e.subscriber.clone(), e.access_level)));

        match terminal {
            Some((Subscriber::Handler(handler), required)) => {
                let message_id = envelope.message_id.clone();
                let origin = envelope.origin.clone();
                let created_at = envelope.created_at;
                let dedup_key = envelope.dedup_key();
                let reply_target = Target::Peer(origin.unique_id.clone());
                if origin.access_level < required {
                    let result = Err(ErrorBody::new(
                        ErrorCode::Unauthorized,
                        format!("{endpoint} requires {required:?} access"),
                    ));
                    self.cache_response(dedup_key, result.clone());
                    return self.reply(message_id, reply_target, created_at, result).await;
                }
                let result = handler.call(envelope).await;
                self.cache_response(dedup_key, result.clone());
                self.reply(message_id, reply_target, created_at, result).await
            }
            Some((Subscriber::Connection(connection_id), _)) => self.forward(&connection_id, envelope).await,
            None => {
                warn!(endpoint = %endpoint, "no handler for endpoint");
                let message_id = envelope.message_id.clone();
                let dedup_key = envelope.dedup_key();
                let result = Err(ErrorBody::new(ErrorCode::NoHandler, format!("no handler for {endpoint}")));
                self.cache_response(dedup_key, result.clone());
                self.reply(message_id, Target::Peer(envelope.origin.unique_id.clone()), envelope.created_at, result)
                    .await
            }
        }
    }

    /// Dispatches a request and returns its result directly, instead of
    /// routing the reply through a registered connection. Used by the HTTP
    /// fallback transport, which POSTs one envelope and expects the reply
    /// back on the same response, not through `dispatch_response`.
    pub async fn dispatch_local(&self, envelope: Envelope) -> Result<serde_json::Value, ErrorBody> {
        if envelope.kind != Kind::Request {
            return Err(ErrorBody::new(ErrorCode::InvalidMessage, "the http transport only carries requests"));
        }
        if self.state().await == RouterState::Stopped {
            return Err(ErrorBody::new(ErrorCode::PeerDisconnected, "router is stopped"));
        }
        if !self.check_and_mark_dedup(&envelope) {
            return match self.response_cache.get(&envelope.dedup_key()) {
                Some(entry) => entry.1.clone(),
                None => Err(ErrorBody::new(ErrorCode::Cancelled, "duplicate request dropped before a response was cached")),
            };
        }
        let Some(endpoint) = envelope.endpoint.clone() else {
            return Err(ErrorBody::new(ErrorCode::InvalidMessage, "request is missing an endpoint"));
        };
        let terminal = self
            .subscribers
            .get(&endpoint)
            .and_then(|entries| entries.iter().find(|e| e.terminal).map(|e| (e.subscriber.clone(), e.access_level)));
        let dedup_key = envelope.dedup_key();
        let origin_access_level = envelope.origin.access_level;

        let result = match terminal {
            Some((Subscriber::Handler(handler), required)) if origin_access_level >= required => handler.call(envelope).await,
            Some((Subscriber::Handler(_), required)) => {
                Err(ErrorBody::new(ErrorCode::Unauthorized, format!("{endpoint} requires {required:?} access")))
            }
            Some((Subscriber::Connection(_), _)) => {
                Err(ErrorBody::new(ErrorCode::NoHandler, format!("{endpoint} is only reachable over a persistent connection")))
            }
            None => Err(ErrorBody::new(ErrorCode::NoHandler, format!("no handler for {endpoint}"))),
        };
        self.cache_response(dedup_key, result.clone());
        result
    }

    async fn dispatch_event(&self, envelope: Envelope) -> Result<(), RouteError> {
        let Some(endpoint) = envelope.endpoint.clone() else {
            return Err(RouteError::NoHandler);
        };
        let Some(entries) = self.subscribers.get(&endpoint) else {
            return Ok(());
        };
        for entry in entries.iter() {
            match &entry.subscriber {
                Subscriber::Connection(connection_id) => {
                    if let Some(handle) = self.connections.get(connection_id) {
                        let _ = handle.send(envelope.clone()).await;
                    }
                }
                Subscriber::Handler(handler) => {
                    let _ = handler.call(envelope.clone()).await;
                }
            }
        }
        Ok(())
    }

    async fn dispatch_response(&self, envelope: Envelope) -> Result<(), RouteError> {
        match &envelope.target {
            Target::Peer(peer_id) => match self.connections.get(peer_id) {
                Some(handle) => handle.send(envelope.clone()).await,
                None => Err(RouteError::PeerDisconnected),
            },
            Target::Any => Err(RouteError::PeerDisconnected),
        }
    }

    async fn forward(&self, connection_id: &str, envelope: Envelope) -> Result<(), RouteError> {
        match self.connections.get(connection_id) {
            Some(handle) => handle.send(envelope).await,
            None => Err(RouteError::PeerDisconnected),
        }
    }

    /// Builds and dispatches a response envelope. `correlation_id` is the
    /// original request's `message_id` — requests never carry a
    /// `correlationId` of their own, so a reply is always correlated back
    /// by message identity, not by a field the request echoed.
    async fn reply(
        &self,
        correlation_id: String,
        target: Target,
        created_at: i64,
        result: Result<serde_json::Value, ErrorBody>,
    ) -> Result<(), RouteError> {
        let payload = match result {
            Ok(value) => value,
            Err(error) => serde_json::json!({ "error": error }),
        };
        let server_origin = crate::context::Context::new("jtag-server", crate::context::Environment::Server);
        let response = Envelope::response(correlation_id, server_origin, target, payload, created_at)
            .map_err(|_| RouteError::NoHandler)?;
        self.dispatch_response(response).await
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
