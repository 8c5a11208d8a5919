// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `settings.json`: user/hardware preferences, including the shared
//! auth secret — the gateway's entire authentication model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub require_api_key: bool,
    #[serde(default)]
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self { require_api_key: false, api_key: String::new() }
    }
}

impl Settings {
    /// Whether `candidate` satisfies auth. Always true when auth is
    /// not required; otherwise a non-empty exact match.
    pub fn authorize(&self, candidate: Option<&str>) -> bool {
        if !self.require_api_key {
            return true;
        }
        matches!(candidate, Some(k) if !k.is_empty() && k == self.api_key)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
