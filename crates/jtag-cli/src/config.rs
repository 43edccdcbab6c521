// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// Command-line client for a running fabric server: `jtag <endpoint>
/// [--param=value]…`, `jtag list`, `jtag system/start`.
#[derive(Debug, Parser)]
#[command(name = "jtag", version, about)]
pub struct Config {
    /// WebSocket URL of the fabric server.
    #[arg(long, env = "JTAG_CLI_WS_URL", default_value = "ws://127.0.0.1:9001/ws")]
    pub ws_url: String,

    /// Unique id this CLI invocation presents itself as.
    #[arg(long, env = "JTAG_CLI_UNIQUE_ID", default_value = "jtag-cli")]
    pub unique_id: String,

    /// Root of the instance's state directory, used by `system/start` to
    /// poll for the system-ready signal.
    #[arg(long, env = "JTAG_CLI_INSTANCE_ROOT")]
    pub instance_root: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Enumerate every command registered on the server.
    List,
    /// Wait for the server's system-ready signal.
    #[command(name = "system/start")]
    SystemStart,
    /// Any other endpoint, e.g. `files/read --param=path=README.md`.
    #[command(external_subcommand)]
    Invoke(Vec<String>),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
