// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end fabric tests.
//!
//! Runs a real `jtag_server::run()` in-process on an ephemeral port and
//! exercises it with the real `jtag-client` and `jtag-transport` crates,
//! rather than spawning a compiled binary as a subprocess.

use std::net::TcpListener;
use std::path::PathBuf;

use jtag_server::ServerConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running fabric server instance, shut down and cleaned up on drop.
pub struct FabricServer {
    pub port: u16,
    pub instance: String,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FabricServer {
    /// Starts a server under a freshly generated instance name so
    /// concurrent tests never share a schema catalog or signal directory.
    pub async fn start() -> anyhow::Result<Self> {
        let port = free_port()?;
        let instance = format!("spec-{}", uuid::Uuid::new_v4());
        let shutdown = CancellationToken::new();

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: Some(port),
            default_port: port,
            test_port: port,
            ui_port: port,
            instance: instance.clone(),
            instance_root: None,
            queue_capacity: 256,
            node_env: None,
        };

        let task_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = jtag_server::run(config, task_shutdown).await {
                eprintln!("fabric server exited with error: {err:#}");
            }
        });

        // Give the listener a moment to bind before the caller connects.
        for _ in 0..50 {
            if TcpListener::bind(("127.0.0.1", port)).is_err() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        Ok(Self { port, instance, shutdown, handle: Some(handle) })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub fn instance_root(&self) -> PathBuf {
        PathBuf::from(".continuum/jtag").join(&self.instance)
    }

    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        let _ = std::fs::remove_dir_all(self.instance_root());
    }
}

impl Drop for FabricServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = std::fs::remove_dir_all(self.instance_root());
    }
}
