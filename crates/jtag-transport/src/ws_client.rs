// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use jtag_core::{BoxFuture, Envelope, Kind, OutboundHandle, RouteError};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handshake::HandshakeFrame;
use crate::queue::OutboundQueue;

const RECONNECT_INITIAL: Duration = Duration::from_millis(500);
const RECONNECT_MAX: Duration = Duration::from_secs(30);

/// The client side of the fabric's WebSocket transport: reconnects with
/// truncated exponential backoff and resends any still-live request whose
/// response hadn't arrived before the connection dropped, using its
/// original `message_id` so the server's dedup set treats the resend as
/// the same message rather than a new one.
///
/// Grounded on `examples/groblegark-coop/crates/cli/src/broker/mux.rs`'s
/// `run_pod_stream`/`connect_and_stream` backoff loop and
/// `crates/mux/src/upstream/bridge.rs`'s retained-request-text-for-resend
/// idea (here, the retained value is the already-well-formed `Envelope`
/// itself rather than raw text, since both sides already agree on the wire
/// shape).
pub struct WsClient {
    url: String,
    handshake: HandshakeFrame,
    outbound: Arc<OutboundQueue>,
    pending: DashMap<String, Envelope>,
    inbound_tx: mpsc::UnboundedSender<Envelope>,
    cancel: CancellationToken,
    connected: AtomicBool,
}

impl WsClient {
    pub fn connect(url: impl Into<String>, handshake: HandshakeFrame, queue_capacity: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<Envelope>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            url: url.into(),
            handshake,
            outbound: Arc::new(OutboundQueue::new(queue_capacity)),
            pending: DashMap::new(),
            inbound_tx,
            cancel: CancellationToken::new(),
            connected: AtomicBool::new(false),
        });
        tokio::spawn(client.clone().run());
        (client, inbound_rx)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect(&self) {
        self.cancel.cancel();
    }

    /// Drops a request from the resend-on-reconnect table without waiting
    /// for a response, so a request the caller has already given up on
    /// (timed out client-side) isn't resent forever on every reconnect.
    pub fn forget(&self, message_id: &str) {
        self.pending.remove(message_id);
    }

    async fn run(self: Arc<Self>) {
        let mut backoff = RECONNECT_INITIAL;
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            match self.connect_and_pump().await {
                Ok(()) => backoff = RECONNECT_INITIAL,
                Err(err) => warn!(%err, url = %self.url, "websocket connection ended"),
            }
            self.connected.store(false, Ordering::SeqCst);
            if self.cancel.is_cancelled() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = self.cancel.cancelled() => return,
            }
            backoff = (backoff * 2).min(RECONNECT_MAX);
        }
    }

    async fn connect_and_pump(self: &Arc<Self>) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        let (stream, _) = tokio_tungstenite::connect_async(&self.url).await?;
        let (mut sink, mut stream) = stream.split();

        let handshake_text = serde_json::to_string(&self.handshake).unwrap_or_default();
        sink.send(Message::Text(handshake_text.into())).await?;
        self.connected.store(true, Ordering::SeqCst);
        info!(url = %self.url, "connected");

        for entry in self.pending.iter() {
            let envelope = entry.value().clone();
            debug!(message_id = %envelope.message_id, "resending live request after reconnect");
            if sink.send(Message::Text(serde_json::to_string(&envelope).unwrap_or_default().into())).await.is_err() {
                break;
            }
        }

        let write_queue = self.outbound.clone();
        let write_task = tokio::spawn(async move {
            loop {
                let envelope = write_queue.pop().await;
                let Ok(text) = serde_json::to_string(&envelope) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    write_task.abort();
                    return Ok(());
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_inbound(&text),
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            write_task.abort();
                            return Err(err);
                        }
                        None => {
                            write_task.abort();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn handle_inbound(&self, text: &str) {
        let Ok(envelope) = serde_json::from_str::<Envelope>(text) else {
            debug!("dropped unparsable inbound frame");
            return;
        };
        if envelope.kind == Kind::Response {
            if let Some(correlation_id) = &envelope.correlation_id {
                // A response's correlation_id always echoes the original
                // request's message_id, the same key `pending` is stored under.
                self.pending.remove(correlation_id);
            }
        }
        let _ = self.inbound_tx.send(envelope);
    }
}

impl OutboundHandle for WsClient {
    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<(), RouteError>> {
        Box::pin(async move {
            if envelope.kind == Kind::Request {
                self.pending.insert(envelope.message_id.clone(), envelope.clone());
            }
            self.outbound.push(envelope).await
        })
    }

    fn queue_depth(&self) -> usize {
        self.outbound.len_hint()
    }
}
