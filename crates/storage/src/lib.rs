// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! mg-storage: atomic sidecar JSON persistence (`model_folders.json`,
//! `settings.json`).

pub mod atomic;
pub mod folders;
pub mod sidecar;
pub mod settings;

pub use atomic::{rotate_bak_path, write_atomic, MAX_BAK_FILES};
pub use folders::TrackedFolders;
pub use sidecar::{Sidecar, SidecarError};
pub use settings::Settings;
