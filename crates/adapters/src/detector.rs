// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Detector` collaborator: turns a set of tracked model-file
//! folders into `ModelConfig` entries, typically using hardware-aware
//! heuristics (VRAM size, GPU layer counts) to pick launch flags.
//!
//! That heuristic is explicitly out of scope here (see the module
//! Non-goals) — `NullDetector` satisfies the trait contract without
//! pretending to implement it.

use mg_core::ModelConfig;
use std::path::Path;

pub trait Detector: Send + Sync {
    fn scan(&self, folders: &[&Path]) -> Vec<ModelConfig>;
}

#[derive(Debug, Default)]
pub struct NullDetector;

impl Detector for NullDetector {
    fn scan(&self, folders: &[&Path]) -> Vec<ModelConfig> {
        tracing::info!(
            folder_count = folders.len(),
            "hardware-aware model detection is not implemented; returning no models"
        );
        Vec::new()
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
