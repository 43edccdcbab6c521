// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::endpoint::Endpoint;
use crate::error::InvalidMessage;
use crate::hash::content_hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Request,
    Response,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Who an envelope is addressed to: a specific connection, or anyone
/// subscribed to the endpoint (used for broadcast events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Any,
    Peer(String),
}

/// The single message shape carried over every transport: requests,
/// responses, and events all travel as an `Envelope`, distinguished by
/// `kind` and validated by [`validate`] before the router ever sees one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub message_id: String,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub origin: Context,
    pub target: Target,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: i64,
    pub hash: String,
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn request(
        endpoint: Endpoint,
        origin: Context,
        target: Target,
        payload: serde_json::Value,
        priority: Priority,
        created_at: i64,
    ) -> Result<Self, InvalidMessage> {
        let message_id = uuid_like(&origin.unique_id, created_at, &endpoint);
        let hash = content_hash(endpoint.as_str(), &payload, &origin.unique_id);
        let envelope = Envelope {
            message_id,
            kind: Kind::Request,
            endpoint: Some(endpoint),
            correlation_id: None,
            origin,
            target,
            priority,
            created_at,
            hash,
            payload,
        };
        validate(&envelope)?;
        Ok(envelope)
    }

    pub fn response(
        correlation_id: impl Into<String>,
        origin: Context,
        target: Target,
        payload: serde_json::Value,
        created_at: i64,
    ) -> Result<Self, InvalidMessage> {
        let correlation_id = correlation_id.into();
        let hash = content_hash("", &payload, &origin.unique_id);
        let envelope = Envelope {
            message_id: format!("{correlation_id}:response"),
            kind: Kind::Response,
            endpoint: None,
            correlation_id: Some(correlation_id),
            origin,
            target,
            priority: Priority::Normal,
            created_at,
            hash,
            payload,
        };
        validate(&envelope)?;
        Ok(envelope)
    }

    pub fn event(
        endpoint: Endpoint,
        origin: Context,
        target: Target,
        payload: serde_json::Value,
        priority: Priority,
        created_at: i64,
    ) -> Result<Self, InvalidMessage> {
        let message_id = uuid_like(&origin.unique_id, created_at, &endpoint);
        let hash = content_hash(endpoint.as_str(), &payload, &origin.unique_id);
        let envelope = Envelope {
            message_id,
            kind: Kind::Event,
            endpoint: Some(endpoint),
            correlation_id: None,
            origin,
            target,
            priority,
            created_at,
            hash,
            payload,
        };
        validate(&envelope)?;
        Ok(envelope)
    }

    pub fn dedup_key(&self) -> (String, String) {
        (self.origin.unique_id.clone(), self.hash.clone())
    }
}

fn uuid_like(unique_id: &str, created_at: i64, endpoint: &Endpoint) -> String {
    format!("{unique_id}-{created_at}-{}", endpoint.as_tool_name())
}

/// Checks the per-kind invariants: requests and events carry an endpoint;
/// only responses carry a correlation id (a reply is correlated back by
/// the request's own `message_id`, never by a field the request echoed).
pub fn validate(envelope: &Envelope) -> Result<(), InvalidMessage> {
    match envelope.kind {
        Kind::Request => {
            if envelope.endpoint.is_none() {
                return Err(InvalidMessage::MissingEndpoint);
            }
            if envelope.correlation_id.is_some() {
                return Err(InvalidMessage::RequestHasCorrelationId);
            }
        }
        Kind::Response => {
            if envelope.correlation_id.is_none() {
                return Err(InvalidMessage::ResponseMissingCorrelationId);
            }
        }
        Kind::Event => {
            if envelope.endpoint.is_none() {
                return Err(InvalidMessage::MissingEndpoint);
            }
            if envelope.correlation_id.is_some() {
                return Err(InvalidMessage::EventHasCorrelationId);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
