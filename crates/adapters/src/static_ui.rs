// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `StaticUI` collaborator: mounts a browser UI's routes onto the
//! daemon's router. Out of scope here — `NullStaticUI` mounts nothing
//! so `mg-daemon` never special-cases "no UI present".

use axum::Router;

pub trait StaticUI: Send + Sync {
    fn router(&self) -> Router;
}

#[derive(Debug, Default)]
pub struct NullStaticUI;

impl StaticUI for NullStaticUI {
    fn router(&self) -> Router {
        Router::new()
    }
}

#[cfg(test)]
#[path = "static_ui_tests.rs"]
mod tests;
