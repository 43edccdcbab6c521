// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use jtag_core::{BoxFuture, Envelope, OutboundHandle, RouteError};

/// A stateless request/response transport for clients that can't hold a
/// WebSocket open. Each `send` is one POST; there is no server-initiated
/// push, so event subscriptions registered over this transport never fire
/// — see DESIGN.md Open Question 4, a documented limitation rather than a
/// worked-around one.
///
/// Grounded on `examples/groblegark-coop/crates/mux/src/upstream/client.rs`
/// (`UpstreamClient`: base URL + bearer token + `reqwest::Client` with a
/// fixed timeout, `.error_for_status()?` then `.json()`).
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<Envelope, RouteError> {
        let response = self
            .client
            .post(format!("{}/api/jtag/message", self.base_url))
            .json(envelope)
            .send()
            .await
            .map_err(|_| RouteError::PeerDisconnected)?;

        if !response.status().is_success() {
            return Err(RouteError::PeerDisconnected);
        }
        response.json::<Envelope>().await.map_err(|_| RouteError::PeerDisconnected)
    }
}

impl OutboundHandle for HttpTransport {
    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<(), RouteError>> {
        Box::pin(async move {
            self.send_envelope(&envelope).await?;
            Ok(())
        })
    }

    fn queue_depth(&self) -> usize {
        0
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
