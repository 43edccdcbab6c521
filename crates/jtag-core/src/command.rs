// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// Required access level for a registered command. Checked by the server
/// before a request ever reaches its handler — see DESIGN.md's
/// "Supplemented: access levels" note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Public,
    Authenticated,
    Admin,
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Public
    }
}

/// A single field of a command's parameter or result shape. Deliberately
/// small: this is a description for humans and for the MCP bridge's tool
/// schema translation, not a full JSON-Schema implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSchema {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ParamSchema {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            description: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Immutable once registered, and snapshotted verbatim to the schema
/// catalog file the MCP bridge reads on startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub endpoint: Endpoint,
    pub description: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ParamSchema>,
    #[serde(default)]
    pub access_level: AccessLevel,
}

impl CommandDescriptor {
    pub fn new(endpoint: Endpoint, description: impl Into<String>) -> Self {
        Self {
            endpoint,
            description: description.into(),
            params: BTreeMap::new(),
            result: None,
            access_level: AccessLevel::Public,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, schema: ParamSchema) -> Self {
        self.params.insert(name.into(), schema);
        self
    }

    pub fn with_result(mut self, schema: ParamSchema) -> Self {
        self.result = Some(schema);
        self
    }

    pub fn with_access_level(mut self, level: AccessLevel) -> Self {
        self.access_level = level;
        self
    }
}
