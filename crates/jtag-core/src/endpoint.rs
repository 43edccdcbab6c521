// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidMessage;

/// A validated `domain/command` address, e.g. `files/read` or `system/status`.
///
/// Endpoints are non-empty, slash-separated, and carry no leading or
/// trailing slash; each segment must be non-empty. Validation happens once
/// at construction so every other layer can treat an `Endpoint` as already
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidMessage> {
        let raw = raw.into();
        if raw.is_empty() || raw.starts_with('/') || raw.ends_with('/') {
            return Err(InvalidMessage::MalformedEndpoint(raw));
        }
        if raw.split('/').any(|segment| segment.is_empty()) {
            return Err(InvalidMessage::MalformedEndpoint(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name with `/` replaced by `_`, used by the MCP bridge for tool names.
    pub fn as_tool_name(&self) -> String {
        self.0.replace('/', "_")
    }

    pub fn domain(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = InvalidMessage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Endpoint::parse(value)
    }
}

impl From<Endpoint> for String {
    fn from(value: Endpoint) -> Self {
        value.0
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
