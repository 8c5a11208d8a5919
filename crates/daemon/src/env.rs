// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon binary.

use std::path::PathBuf;

/// Resolve state directory: `MG_STATE_DIR` > `XDG_STATE_HOME/mg` > `~/.local/state/mg`.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("MG_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("mg"));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".local/state/mg"))
}

/// Config file path: `MG_CONFIG` overrides the default `<state_dir>/gateway.yaml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MG_CONFIG") {
        return Some(PathBuf::from(path));
    }
    state_dir().map(|dir| dir.join("gateway.yaml"))
}

/// Listen address: `MG_LISTEN`, default `127.0.0.1:8080`.
pub fn listen_addr() -> String {
    std::env::var("MG_LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}
