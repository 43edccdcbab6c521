// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::command::AccessLevel;

/// Where a message originated or is addressed: the server process itself,
/// a browser-hosted UI, or a remote CLI/daemon peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Server,
    Browser,
    Remote,
}

/// Identity carried on every envelope: who sent it, under what session, and
/// at what access level. The router checks `access_level` against a
/// command's required [`AccessLevel`] before a terminal handler runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub unique_id: String,
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub annotations: serde_json::Map<String, serde_json::Value>,
}

impl Context {
    pub fn new(unique_id: impl Into<String>, environment: Environment) -> Self {
        Self {
            unique_id: unique_id.into(),
            environment,
            session_id: None,
            access_level: AccessLevel::Public,
            annotations: serde_json::Map::new(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }
}
