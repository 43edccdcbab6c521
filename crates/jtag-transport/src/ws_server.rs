// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use axum::Router as AxumRouter;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use jtag_core::{Context, Environment, Envelope, Router as JtagRouter, Target};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::Connection;
use crate::handshake::{HandshakeFrame, HANDSHAKE_TIMEOUT};

/// Shared state behind every `/ws` connection: the fabric's router plus the
/// table of live connections this server process currently holds.
///
/// Grounded on `examples/groblegark-coop/crates/cli/src/transport/mod.rs`'s
/// `build_router`/`build_router_inner` (axum `Router` + CORS layer) and
/// `transport/ws.rs`'s `handle_connection` event loop.
pub struct WsServerState {
    pub router: Arc<JtagRouter>,
    pub connections: DashMap<String, Arc<Connection>>,
    pub queue_capacity: usize,
}

impl WsServerState {
    pub fn new(router: Arc<JtagRouter>, queue_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            router,
            connections: DashMap::new(),
            queue_capacity,
        })
    }
}

pub fn build_router(state: Arc<WsServerState>) -> AxumRouter {
    AxumRouter::new()
        .route("/ws", get(ws_handler))
        .route("/api/jtag/message", post(http_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ws_handler(State(state): State<Arc<WsServerState>>, ws: WebSocketUpgrade) -> axum::response::Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// The stateless fallback for clients that can't hold a WebSocket open: one
/// POST in, one response `Envelope` out, routed through
/// [`jtag_core::Router::dispatch_local`] rather than a connection, so the
/// reply never depends on `connections` holding anything for this peer.
async fn http_handler(State(state): State<Arc<WsServerState>>, Json(envelope): Json<Envelope>) -> axum::response::Response {
    let correlation_id = envelope.message_id.clone();
    let created_at = envelope.created_at;
    let result = state.router.dispatch_local(envelope).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    let payload = match result {
        Ok(value) => value,
        Err(err) => serde_json::json!({ "error": err }),
    };
    let server_origin = Context::new("jtag-server", Environment::Server);
    match Envelope::response(correlation_id, server_origin, Target::Any, payload, created_at) {
        Ok(response) => (status, Json(response)).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn handle_connection(socket: WebSocket, state: Arc<WsServerState>) {
    let (mut sink, mut stream) = socket.split();

    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, stream.next()).await;
    let (session_id, peer_context) = match handshake {
        Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<HandshakeFrame>(&text) {
            Ok(HandshakeFrame::SessionHandshake { session_id, context }) => (session_id, context),
            Err(err) => {
                warn!(%err, "handshake frame did not parse");
                let _ = sink.close().await;
                return;
            }
        },
        _ => {
            warn!("connection did not handshake within the timeout");
            let _ = sink.close().await;
            return;
        }
    };

    let connection_id = Uuid::new_v4().to_string();
    let connection = Connection::new(connection_id.clone(), peer_context, session_id, state.queue_capacity);
    state.connections.insert(connection_id.clone(), connection.clone());
    state.router.register_connection(connection_id.clone(), connection.clone());
    info!(connection_id = %connection_id, "peer connected");

    let writer_connection = connection.clone();
    let writer = tokio::spawn(async move {
        loop {
            let envelope = writer_connection.next_outbound().await;
            let Ok(text) = serde_json::to_string(&envelope) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let Ok(Message::Text(text)) = frame else {
            continue;
        };
        connection.touch().await;
        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => {
                if let Err(err) = state.router.post(envelope).await {
                    debug!(%err, connection_id = %connection_id, "post failed");
                }
            }
            Err(err) => debug!(%err, "dropped unparsable frame"),
        }
    }

    writer.abort();
    state.connections.remove(&connection_id);
    state.router.unregister_connection(&connection_id);
    info!(connection_id = %connection_id, "peer disconnected");
}

#[cfg(test)]
#[path = "ws_server_tests.rs"]
mod tests;
