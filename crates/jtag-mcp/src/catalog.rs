// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use jtag_core::CommandDescriptor;
use serde_json::{json, Value};

/// One MCP tool, translated from a registered [`CommandDescriptor`].
/// Endpoint `/` becomes `_` (MCP tool names can't contain slashes), and
/// every description is prefixed `[JTAG]` so a model looking at a mixed
/// tool list can tell which ones are fabric commands.
///
/// Grounded on `examples/airsstack-airsstack`'s MCP tool-provider shape:
/// one descriptor in, one `{name, description, inputSchema}` tool out.
#[derive(Debug, Clone, serde::Serialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn read_catalog(path: &Path) -> std::io::Result<Vec<CommandDescriptor>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

pub fn translate(descriptor: &CommandDescriptor) -> McpTool {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for (name, schema) in &descriptor.params {
        properties.insert(
            name.clone(),
            json!({
                "type": schema.ty,
                "description": schema.description.clone().unwrap_or_default(),
            }),
        );
        if schema.required {
            required.push(name.clone());
        }
    }

    McpTool {
        name: descriptor.endpoint.as_tool_name(),
        description: format!("[JTAG] {}", descriptor.description),
        input_schema: json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        }),
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
