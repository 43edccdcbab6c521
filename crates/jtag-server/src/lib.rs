// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod builtins;
pub mod config;
pub mod instance;
pub mod registry;

use std::sync::Arc;
use std::time::Instant;

use jtag_core::{Router, RouterConfig};
use jtag_transport::WsServerState;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::ServerConfig;
pub use instance::InstancePaths;
pub use registry::CommandRegistry;

/// The authoritative process: binds the router to the WebSocket listener,
/// writes the schema catalog and the `system-ready` signal, and serves
/// until `shutdown` fires.
///
/// Grounded on `examples/groblegark-coop/crates/mux/src/lib.rs`'s
/// `run(config) -> anyhow::Result<()>` (bind, spawn background tasks,
/// `axum::serve(...).with_graceful_shutdown(...)`).
pub async fn run(config: ServerConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let paths = match &config.instance_root {
        Some(root) => InstancePaths::resolve_under(root.clone(), &config.instance),
        None => InstancePaths::resolve(&config.instance),
    };
    paths.ensure_created()?;

    let router = Router::new(RouterConfig::default());
    let registry = Arc::new(CommandRegistry::new(router.clone()));
    builtins::register_builtins(&registry, router.clone(), Instant::now());
    registry.write_catalog(&paths.schema_catalog_path())?;

    let state = WsServerState::new(router, config.queue_capacity);
    let app = jtag_transport::build_router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, instance = %config.instance, "jtag-server listening");

    std::fs::write(
        paths.system_ready_signal_path(),
        serde_json::json!({ "ready": true, "addr": bind_addr }).to_string(),
    )?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}
