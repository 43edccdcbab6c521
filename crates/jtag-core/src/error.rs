// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fabric's wire-visible error taxonomy. Every response that carries an
/// error, and every rejection the router or transport makes before a
/// handler runs, is expressed as one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessage,
    NoHandler,
    EndpointTaken,
    Timeout,
    QueueFull,
    PeerDisconnected,
    HandshakeTimeout,
    RemoteError,
    ClientShutdown,
    Cancelled,
    Unauthorized,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidMessage => "invalid_message",
            ErrorCode::NoHandler => "no_handler",
            ErrorCode::EndpointTaken => "endpoint_taken",
            ErrorCode::Timeout => "timeout",
            ErrorCode::QueueFull => "queue_full",
            ErrorCode::PeerDisconnected => "peer_disconnected",
            ErrorCode::HandshakeTimeout => "handshake_timeout",
            ErrorCode::RemoteError => "remote_error",
            ErrorCode::ClientShutdown => "client_shutdown",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Unauthorized => "unauthorized",
        }
    }

    /// HTTP status for the `http` fallback transport's error responses.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidMessage => 400,
            ErrorCode::NoHandler => 404,
            ErrorCode::EndpointTaken => 409,
            ErrorCode::Timeout => 504,
            ErrorCode::QueueFull => 503,
            ErrorCode::PeerDisconnected => 502,
            ErrorCode::HandshakeTimeout => 408,
            ErrorCode::RemoteError => 502,
            ErrorCode::ClientShutdown => 503,
            ErrorCode::Cancelled => 499,
            ErrorCode::Unauthorized => 403,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The body carried by a response envelope whose `kind` is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Validation failures raised while constructing or checking an envelope,
/// before it is ever handed to the router.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidMessage {
    #[error("malformed endpoint: {0:?}")]
    MalformedEndpoint(String),
    #[error("request envelope must not carry a correlation_id")]
    RequestHasCorrelationId,
    #[error("response envelope is missing a correlation_id")]
    ResponseMissingCorrelationId,
    #[error("event envelope must not carry a correlation_id")]
    EventHasCorrelationId,
    #[error("request envelope is missing an endpoint")]
    MissingEndpoint,
    #[error("envelope hash does not match its content")]
    HashMismatch,
}

impl From<InvalidMessage> for ErrorBody {
    fn from(value: InvalidMessage) -> Self {
        ErrorBody::new(ErrorCode::InvalidMessage, value.to_string())
    }
}
