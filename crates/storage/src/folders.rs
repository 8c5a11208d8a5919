// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `model_folders.json`: directories the gateway scans for model files
//! on reconfigure, grown as downloads complete.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFolders {
    folders: Vec<PathBuf>,
}

impl TrackedFolders {
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.folders.iter().any(|f| f == dir)
    }

    /// Adds `dir` if absent. Returns whether the set changed.
    pub fn add(&mut self, dir: PathBuf) -> bool {
        if self.contains(&dir) {
            false
        } else {
            self.folders.push(dir);
            true
        }
    }
}

#[cfg(test)]
#[path = "folders_tests.rs"]
mod tests;
