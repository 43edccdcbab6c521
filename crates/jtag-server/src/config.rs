// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Args;

/// Server configuration, resolved the same way `examples/groblegark-coop/
/// crates/mux/src/config.rs`'s `MuxConfig` is: `clap::Args` fields each
/// falling back to an environment variable.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[arg(long, default_value = "127.0.0.1", env = "JTAG_SERVER_HOST")]
    pub host: String,

    /// Overrides the port this process binds; when absent, the port is
    /// derived from `NODE_ENV` (test → `JTAG_TEST_SERVER_PORT`, otherwise
    /// `JTAG_SERVER_PORT`).
    #[arg(long, env = "JTAG_SERVER_PORT_OVERRIDE")]
    pub port: Option<u16>,

    #[arg(long, default_value_t = 9001, env = "JTAG_SERVER_PORT")]
    pub default_port: u16,

    #[arg(long, default_value_t = 9002, env = "JTAG_TEST_SERVER_PORT")]
    pub test_port: u16,

    #[arg(long, default_value_t = 9000, env = "JTAG_UI_PORT")]
    pub ui_port: u16,

    #[arg(long, default_value = "default", env = "JTAG_INSTANCE")]
    pub instance: String,

    /// Root directory instance state lives under; when absent, instances
    /// live at `.continuum/jtag/<instance>` relative to the current
    /// directory. A launcher that already knows where it wants the
    /// system-ready signal to land (the CLI, the MCP bridge) sets this so
    /// its own poll path and this process's write path agree exactly.
    #[arg(long, env = "JTAG_SERVER_INSTANCE_ROOT")]
    pub instance_root: Option<PathBuf>,

    #[arg(long, default_value_t = 256, env = "JTAG_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    #[arg(long, env = "NODE_ENV")]
    pub node_env: Option<String>,
}

impl ServerConfig {
    pub fn resolve_port(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        match self.node_env.as_deref() {
            Some("test") => self.test_port,
            _ => self.default_port,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.resolve_port())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
