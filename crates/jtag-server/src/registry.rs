// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use jtag_core::{CommandDescriptor, CommandHandler, Endpoint, RouteError, Router, Subscriber, SubscriptionId};

/// Wraps [`Router::register`] so every registered command also keeps its
/// [`CommandDescriptor`], and the full catalog can be snapshotted to disk
/// for the MCP bridge to read.
///
/// Grounded on `examples/groblegark-coop/crates/cli/src/broker/registry.rs`
/// (`PodRegistry`: a registry of named entries with a serializable
/// snapshot), generalized from pods to commands.
pub struct CommandRegistry {
    router: Arc<Router>,
    descriptors: DashMap<Endpoint, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            descriptors: DashMap::new(),
        }
    }

    pub fn register(
        &self,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<SubscriptionId, RouteError> {
        let endpoint = descriptor.endpoint.clone();
        let access_level = descriptor.access_level;
        let subscription = self.router.register(endpoint.clone(), Subscriber::Handler(handler), true, access_level)?;
        self.descriptors.insert(endpoint, descriptor);
        Ok(subscription)
    }

    pub fn unregister(&self, subscription: SubscriptionId) {
        self.descriptors.remove(&subscription.endpoint);
        self.router.unregister(subscription);
    }

    pub fn catalog(&self) -> Vec<CommandDescriptor> {
        let mut descriptors: Vec<_> = self.descriptors.iter().map(|e| e.value().clone()).collect();
        descriptors.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        descriptors
    }

    /// Writes the catalog once, at startup; nothing here ever mutates the
    /// file mid-run.
    pub fn write_catalog(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.catalog())?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
