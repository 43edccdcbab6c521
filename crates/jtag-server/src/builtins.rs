// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Instant;

use jtag_core::{BoxFuture, CommandDescriptor, Envelope, ErrorBody, Router};
use serde_json::json;

use crate::registry::CommandRegistry;

struct SystemStatus {
    router: Arc<Router>,
    started_at: Instant,
}

impl jtag_core::CommandHandler for SystemStatus {
    fn call(&self, _envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        let router = self.router.clone();
        let uptime = self.started_at.elapsed().as_secs();
        Box::pin(async move {
            let state = router.state().await;
            let endpoints: Vec<_> = router
                .enumerate()
                .iter()
                .map(|e| json!({"endpoint": e.endpoint.as_str(), "subscriber_count": e.subscriber_count}))
                .collect();
            Ok(json!({
                "state": format!("{state:?}"),
                "endpoints": endpoints,
                "uptime_secs": uptime,
            }))
        })
    }
}

struct ListEndpoints {
    router: Arc<Router>,
}

impl jtag_core::CommandHandler for ListEndpoints {
    fn call(&self, _envelope: Envelope) -> BoxFuture<'static, Result<serde_json::Value, ErrorBody>> {
        let router = self.router.clone();
        Box::pin(async move {
            let endpoints: Vec<_> = router
                .enumerate()
                .iter()
                .map(|e| json!({"endpoint": e.endpoint.as_str(), "subscriber_count": e.subscriber_count}))
                .collect();
            Ok(json!({ "endpoints": endpoints }))
        })
    }
}

/// Registers the two commands that make the fabric self-describing even
/// with no domain collaborator registered: `system/status` and `list`.
pub fn register_builtins(registry: &CommandRegistry, router: Arc<Router>, started_at: Instant) {
    let _ = registry.register(
        CommandDescriptor::new(jtag_core::Endpoint::parse("system/status").unwrap(), "Router state, endpoint count, uptime"),
        Arc::new(SystemStatus { router: router.clone(), started_at }),
    );
    let _ = registry.register(
        CommandDescriptor::new(jtag_core::Endpoint::parse("list").unwrap(), "Lists every currently registered endpoint"),
        Arc::new(ListEndpoints { router }),
    );
}
