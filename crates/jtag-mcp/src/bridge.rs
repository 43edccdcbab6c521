// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};
use std::time::Duration;

use jtag_client::{Client, ConnectOptions};
use jtag_core::{CommandDescriptor, Context, Environment};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::catalog::{self, McpTool};
use crate::protocol::{RpcRequest, RpcResponse};
use crate::screenshot;

const SYSTEM_START_POLL_TIMEOUT: Duration = Duration::from_secs(90);

/// Side-loaded MCP server: reads the schema catalog a `jtag-server`
/// instance wrote on startup, connects to it as an ordinary `jtag-client`,
/// and re-serves every registered command as an MCP tool over stdio.
///
/// Grounded on `examples/airsstack-airsstack`'s stdio transport framing and
/// tool-provider translation, composed with this fabric's own client and
/// catalog types rather than airs-mcp's JSON-RPC request types directly.
pub struct Bridge {
    client: Client,
    tools: Vec<McpTool>,
    descriptors: Vec<CommandDescriptor>,
    instance_root: PathBuf,
}

impl Bridge {
    pub async fn connect(ws_url: &str, catalog_path: &Path, instance_root: PathBuf) -> anyhow::Result<Self> {
        let descriptors = catalog::read_catalog(catalog_path)?;
        let tools = descriptors.iter().map(catalog::translate).collect();

        let options = ConnectOptions::new(ws_url, Context::new("jtag-mcp", Environment::Remote), "mcp-bridge");
        let client = Client::connect(options).await.map_err(|err| anyhow::anyhow!("{err}"))?;

        Ok(Self { client, tools, descriptors, instance_root })
    }

    pub fn tool_list(&self) -> Value {
        let mut tools: Vec<Value> = self.tools.iter().map(|t| serde_json::to_value(t).unwrap_or(Value::Null)).collect();
        tools.push(json!({
            "name": "jtag_system_start",
            "description": "[JTAG] Waits for the fabric's system-ready signal",
            "inputSchema": {"type": "object", "properties": {}},
        }));
        tools.push(json!({
            "name": "jtag_search_tools",
            "description": "[JTAG] Searches registered tool names and descriptions, optionally filtered by endpoint domain",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "category": {"type": "string", "description": "endpoint domain prefix, e.g. \"files\""},
                },
                "required": ["query"],
            },
        }));
        json!({ "tools": tools })
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, String> {
        match name {
            "jtag_system_start" => self.system_start().await,
            "jtag_search_tools" => Ok(self.search_tools(&arguments)),
            _ => self.invoke_command(name, arguments).await,
        }
    }

    async fn invoke_command(&self, tool_name: &str, arguments: Value) -> Result<Value, String> {
        let endpoint = self
            .descriptors
            .iter()
            .find(|d| d.endpoint.as_tool_name() == tool_name)
            .map(|d| d.endpoint.as_str().to_string())
            .ok_or_else(|| format!("unknown tool: {tool_name}"))?;

        let result = self.client.invoke(&endpoint, arguments).await.map_err(|err| err.to_string())?;
        Ok(attach_screenshot_if_present(result))
    }

    async fn system_start(&self) -> Result<Value, String> {
        let signal_path = self.instance_root.join("signals").join("system-ready.json");
        if !signal_path.exists() {
            if let Err(err) = launch_server(&self.instance_root) {
                warn!(%err, "failed to launch jtag-server");
            }
        }
        let deadline = tokio::time::Instant::now() + SYSTEM_START_POLL_TIMEOUT;
        while tokio::time::Instant::now() < deadline {
            if signal_path.exists() {
                return Ok(json!({ "ready": true }));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Err("timed out waiting for system-ready signal".to_string())
    }

    fn search_tools(&self, arguments: &Value) -> Value {
        let query = arguments.get("query").and_then(Value::as_str).unwrap_or("").to_ascii_lowercase();
        let category = arguments.get("category").and_then(Value::as_str);

        let matches: Vec<Value> = self
            .tools
            .iter()
            .zip(self.descriptors.iter())
            .filter(|(_, descriptor)| category.map(|category| descriptor.endpoint.domain() == category).unwrap_or(true))
            .filter(|(tool, _)| tool.name.to_ascii_lowercase().contains(&query) || tool.description.to_ascii_lowercase().contains(&query))
            .map(|(tool, _)| json!({ "name": tool.name, "description": tool.description }))
            .collect();
        json!({ "matches": matches })
    }

    /// Serves MCP over stdio until stdin closes.
    pub async fn run(self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        info!(tool_count = self.tools.len(), "jtag-mcp bridge ready");
        while let Some(line) = reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<RpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(err) => RpcResponse::err(Value::Null, format!("invalid request: {err}")),
            };
            let text = serde_json::to_string(&response)?;
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok(())
    }

    async fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        match request.method.as_str() {
            "tools/list" => RpcResponse::ok(request.id, self.tool_list()),
            "tools/call" => {
                let name = request.params.get("name").and_then(Value::as_str).unwrap_or_default();
                let arguments = request.params.get("arguments").cloned().unwrap_or(json!({}));
                match self.call_tool(name, arguments).await {
                    Ok(value) => RpcResponse::ok(request.id, json!({ "content": [{"type": "text", "text": value.to_string()}], "isError": false })),
                    Err(message) => {
                        warn!(%message, tool = name, "tool call failed");
                        RpcResponse::ok(request.id, json!({ "content": [{"type": "text", "text": message}], "isError": true }))
                    }
                }
            }
            other => RpcResponse::err(request.id, format!("unknown method: {other}")),
        }
    }
}

/// Spawns `jtag-server` detached, pointed at this bridge's own instance
/// root, so the signal file `system_start` polls for is the one the
/// spawned server actually writes. See `jtag-cli`'s `launch_server` for the
/// same pattern on the CLI side.
fn launch_server(instance_root: &Path) -> anyhow::Result<()> {
    let server_exe = std::env::current_exe()?.with_file_name("jtag-server");
    let root = instance_root.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let instance = instance_root.file_name().and_then(|name| name.to_str()).unwrap_or("default").to_string();

    tokio::process::Command::new(server_exe)
        .arg("--instance")
        .arg(instance)
        .arg("--instance-root")
        .arg(root)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;
    Ok(())
}

fn attach_screenshot_if_present(mut result: Value) -> Value {
    let Some(path) = result.get("path").and_then(Value::as_str).map(str::to_string) else {
        return result;
    };
    if !screenshot::is_image_path(&path) {
        return result;
    }
    match screenshot::resize_to_jpeg_base64(Path::new(&path)) {
        Ok(base64_jpeg) => {
            if let Value::Object(ref mut map) = result {
                map.insert("image_base64_jpeg".to_string(), json!(base64_jpeg));
            }
            result
        }
        Err(err) => {
            warn!(%err, path, "failed to resize screenshot");
            result
        }
    }
}
