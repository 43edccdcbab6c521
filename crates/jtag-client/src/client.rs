// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use jtag_core::{Context, Endpoint, Envelope, ErrorBody, Kind, Priority, Target};
use jtag_transport::{HandshakeFrame, WsClient};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::correlation::{CorrelationConfig, CorrelationManager};
use crate::error::ClientError;

const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    pub context: Context,
    pub session_id: String,
    pub queue_capacity: usize,
    pub correlation: CorrelationConfig,
}

impl ConnectOptions {
    pub fn new(url: impl Into<String>, context: Context, session_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            context,
            session_id: session_id.into(),
            queue_capacity: 256,
            correlation: CorrelationConfig::default(),
        }
    }
}

type EventHandler = Box<dyn Fn(Envelope) + Send + Sync>;

/// The fabric's client-facing entry point: `connect`, `invoke` (the
/// `commands.<endpoint>` surface, untyped layer per DESIGN.md Open
/// Question 5), `events().subscribe`, and `disconnect`.
///
/// Grounded on `examples/groblegark-coop/crates/cli/src/mux_client.rs`'s
/// connect/register/heartbeat shape for the connection lifecycle, and
/// `transport/ws_mux.rs`'s per-endpoint subscription table for
/// `events().subscribe`.
pub struct Client {
    ws: Arc<WsClient>,
    correlation: Arc<CorrelationManager>,
    subscriptions: Arc<DashMap<Endpoint, Vec<EventHandler>>>,
    reader: JoinHandle<()>,
    origin: Context,
}

impl Client {
    pub async fn connect(options: ConnectOptions) -> Result<Self, ClientError> {
        let handshake = HandshakeFrame::SessionHandshake {
            session_id: options.session_id.clone(),
            context: options.context.clone(),
        };
        let (ws, mut inbound_rx) = WsClient::connect(options.url, handshake, options.queue_capacity);
        let correlation = CorrelationManager::new(options.correlation);
        let subscriptions: Arc<DashMap<Endpoint, Vec<EventHandler>>> = Arc::new(DashMap::new());

        // A request this manager times out client-side should stop being
        // resent on reconnect; without this, `ws.pending` would retry it
        // forever even though the caller already gave up.
        let expiry_ws = ws.clone();
        correlation.set_on_expire(move |message_id| expiry_ws.forget(message_id));

        let reader_correlation = correlation.clone();
        let reader_subscriptions = subscriptions.clone();
        let reader = tokio::spawn(async move {
            while let Some(envelope) = inbound_rx.recv().await {
                match envelope.kind {
                    Kind::Response => {
                        let Some(correlation_id) = envelope.correlation_id.clone() else {
                            continue;
                        };
                        let result = flatten_command_result(envelope.payload.clone());
                        if !reader_correlation.correlate_response(&correlation_id, result) {
                            debug!(correlation_id, "response for unknown or expired request");
                        }
                    }
                    Kind::Event => {
                        if let Some(endpoint) = &envelope.endpoint {
                            if let Some(handlers) = reader_subscriptions.get(endpoint) {
                                for handler in handlers.iter() {
                                    handler(envelope.clone());
                                }
                            }
                        }
                    }
                    Kind::Request => {}
                }
            }
        });

        Ok(Self {
            ws,
            correlation,
            subscriptions,
            reader,
            origin: options.context,
        })
    }

    /// The untyped invocation layer: `invoke("files/read", json!({...}))`.
    pub async fn invoke(&self, endpoint: &str, params: serde_json::Value) -> Result<serde_json::Value, ClientError> {
        self.invoke_with_priority(endpoint, params, Priority::Normal).await
    }

    pub async fn invoke_with_priority(
        &self,
        endpoint: &str,
        params: serde_json::Value,
        priority: Priority,
    ) -> Result<serde_json::Value, ClientError> {
        let endpoint = Endpoint::parse(endpoint).map_err(|_| ClientError::Timeout)?;
        let created_at = chrono::Utc::now().timestamp_millis();
        let request = Envelope::request(endpoint, self.origin.clone(), Target::Any, params, priority, created_at)
            .map_err(|_| ClientError::Timeout)?;

        let receiver = self.correlation.register(&request)?;
        jtag_core::OutboundHandle::send(self.ws.as_ref(), request)
            .await
            .map_err(|_| ClientError::NotConnected)?;

        receiver.await.map_err(|_| ClientError::ClientShutdown)?
    }

    /// A thin generic wrapper over [`Client::invoke`] for call sites that
    /// want typed params/result without a per-endpoint method table.
    pub async fn call<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: P,
    ) -> Result<R, ClientError> {
        let payload = serde_json::to_value(params).map_err(|_| ClientError::Timeout)?;
        let result = self.invoke(endpoint, payload).await?;
        serde_json::from_value(result).map_err(|_| ClientError::Timeout)
    }

    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }

    /// Drains in-flight requests for up to a 2s grace period, then closes
    /// the transport and fails anything still pending with
    /// `ClientShutdown`.
    pub async fn disconnect(self) {
        let deadline = tokio::time::Instant::now() + DISCONNECT_GRACE;
        while self.correlation.pending_count() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.ws.disconnect();
        self.correlation.shutdown().await;
        self.reader.abort();
    }

    pub fn is_connected(&self) -> bool {
        self.ws.is_connected()
    }
}

pub struct Events<'a> {
    client: &'a Client,
}

impl Events<'_> {
    pub fn subscribe<F>(&self, endpoint: &str, handler: F) -> Result<(), ClientError>
    where
        F: Fn(Envelope) + Send + Sync + 'static,
    {
        let endpoint = Endpoint::parse(endpoint).map_err(|_| ClientError::Timeout)?;
        self.client
            .subscriptions
            .entry(endpoint)
            .or_default()
            .push(Box::new(handler));
        Ok(())
    }
}

/// Legacy nested `{"commandResult": {...}}` wrappers are flattened here,
/// once, so both the client and the MCP bridge see the unwrapped value.
fn flatten_command_result(payload: serde_json::Value) -> Result<serde_json::Value, ErrorBody> {
    if let serde_json::Value::Object(ref map) = payload {
        if let Some(error) = map.get("error") {
            if let Ok(body) = serde_json::from_value::<ErrorBody>(error.clone()) {
                return Err(body);
            }
        }
        if let Some(inner) = map.get("commandResult") {
            return Ok(inner.clone());
        }
    }
    Ok(payload)
}

