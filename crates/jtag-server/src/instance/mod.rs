// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::PathBuf;

/// Resolves and prepares the per-instance state root: `.continuum/jtag/
/// <instance>/...`. Directories are created on first use, the same
/// one-shot `create_dir_all` idiom `examples/groblegark-coop`'s credential
/// `state_dir()` helper uses.
#[derive(Debug, Clone)]
pub struct InstancePaths {
    pub state_root: PathBuf,
}

impl InstancePaths {
    pub fn resolve(instance: &str) -> Self {
        Self::resolve_under(PathBuf::from(".continuum/jtag"), instance)
    }

    pub fn resolve_under(root: PathBuf, instance: &str) -> Self {
        Self {
            state_root: root.join(instance),
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_root.join("logs")
    }

    pub fn signals_dir(&self) -> PathBuf {
        self.state_root.join("signals")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.state_root.join("artifacts")
    }

    pub fn schema_catalog_path(&self) -> PathBuf {
        self.state_root.join("generated-command-schemas.json")
    }

    pub fn system_ready_signal_path(&self) -> PathBuf {
        self.signals_dir().join("system-ready.json")
    }

    pub fn ensure_created(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.state_root)?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.signals_dir())?;
        std::fs::create_dir_all(self.artifacts_dir())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
