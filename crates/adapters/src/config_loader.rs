// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ConfigLoader` collaborator: reads the gateway's YAML config and
//! persists a regenerated one back to disk. The decision of *what* to
//! regenerate belongs to [`crate::detector::Detector`]; this module only
//! owns the read/write mechanics.

use mg_core::{ConfigError, GatewayConfig};
use std::path::{Path, PathBuf};

pub trait ConfigLoader: Send + Sync {
    fn load(&self) -> Result<GatewayConfig, ConfigError>;

    /// Overwrites the config file with `yaml`, atomically.
    fn save(&self, yaml: &str) -> Result<(), ConfigError>;

    fn path(&self) -> &Path;
}

/// Reads/writes a single YAML file on the local filesystem.
pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::load(&self.path)
    }

    fn save(&self, yaml: &str) -> Result<(), ConfigError> {
        mg_storage::write_atomic(&self.path, yaml.as_bytes()).map_err(|source| {
            ConfigError::Write { path: self.path.display().to_string(), source }
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "config_loader_tests.rs"]
mod tests;
