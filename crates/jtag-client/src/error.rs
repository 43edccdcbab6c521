// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jtag_core::ErrorBody;

/// Local-only client conditions layered on top of the wire `ErrorCode`
/// taxonomy: these never travel as a response payload, they're raised by
/// the client itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("request timed out waiting for a response")]
    Timeout,
    #[error("request was cancelled")]
    Cancelled,
    #[error("client is shutting down")]
    ClientShutdown,
    #[error("too many in-flight requests")]
    TooManyPendingRequests,
    #[error("transport is not connected")]
    NotConnected,
    #[error(transparent)]
    Remote(#[from] RemoteErrorWrapper),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RemoteErrorWrapper(pub ErrorBody);

impl From<ErrorBody> for ClientError {
    fn from(value: ErrorBody) -> Self {
        ClientError::Remote(RemoteErrorWrapper(value))
    }
}
