// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod config;
mod params;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use jtag_client::{Client, ConnectOptions};
use jtag_core::{Context, Environment};
use tracing::error;

use config::{Command, Config};

const SYSTEM_START_POLL_TIMEOUT: Duration = Duration::from_secs(90);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    match run(config).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    if let Command::SystemStart = config.command {
        return wait_for_system_ready(&config).await;
    }

    let context = Context::new(config.unique_id.clone(), Environment::Remote);
    let options = ConnectOptions::new(config.ws_url.clone(), context, "jtag-cli");
    let client = Client::connect(options).await.map_err(|err| anyhow::anyhow!("{err}"))?;

    let result = match config.command {
        Command::List => client.invoke("list", serde_json::json!({})).await,
        Command::Invoke(raw) => {
            let (endpoint, params) = params::parse_invoke_args(&raw)?;
            client.invoke(&endpoint, params).await
        }
        Command::SystemStart => unreachable!("handled above"),
    };

    client.disconnect().await;

    let value = result.map_err(|err| anyhow::anyhow!("{err}"))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn wait_for_system_ready(config: &Config) -> anyhow::Result<()> {
    let instance_root = config
        .instance_root
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--instance-root (or JTAG_CLI_INSTANCE_ROOT) is required for system/start"))?;
    let signal_path = instance_root.join("signals").join("system-ready.json");

    if !signal_path.exists() {
        launch_server(&instance_root)?;
    }

    let deadline = tokio::time::Instant::now() + SYSTEM_START_POLL_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if signal_path.exists() {
            println!("{}", serde_json::json!({"ready": true}));
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    anyhow::bail!("timed out waiting for system-ready signal at {}", signal_path.display());
}

/// Spawns `jtag-server` detached, pointed at the same instance root this
/// process is about to poll, so the signal file it waits for is the one the
/// spawned server actually writes. Found as a sibling of this binary's own
/// executable, matching how the two ship together in the same target dir.
///
/// Grounded on `examples/groblegark-coop/crates/cli/src/pty/attach.rs`'s
/// `tokio::process::Command` + null-stdio spawn for a detached child.
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
