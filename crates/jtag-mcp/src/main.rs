// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;
use jtag_mcp::Bridge;

/// Connects to a running `jtag-server` instance and re-serves its
/// registered commands as MCP tools over stdio.
#[derive(Debug, Parser)]
struct Cli {
    /// WebSocket URL of the fabric server to bridge into MCP.
    #[arg(long, env = "JTAG_MCP_WS_URL", default_value = "ws://127.0.0.1:9001/ws")]
    ws_url: String,

    /// Path to the schema catalog the server wrote on startup.
    #[arg(long, env = "JTAG_MCP_CATALOG_PATH")]
    catalog_path: PathBuf,

    /// Root of the instance's state directory, used to poll for the
    /// system-ready signal.
    #[arg(long, env = "JTAG_MCP_INSTANCE_ROOT")]
    instance_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let bridge = Bridge::connect(&cli.ws_url, &cli.catalog_path, cli.instance_root).await?;
    bridge.run().await
}
