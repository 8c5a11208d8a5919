// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic JSON sidecar persistence built on [`crate::atomic`].

use crate::atomic::write_atomic;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single JSON file, persisted through [`write_atomic`]'s backup
/// rotation. `T` must round-trip through `serde_json` and be cheap to
/// clone — callers hold it in memory and only touch disk on save.
pub struct Sidecar<T> {
    path: PathBuf,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + Default> Sidecar<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _marker: std::marker::PhantomData }
    }

    /// Loads the sidecar, returning `T::default()` if the file does
    /// not exist yet (first run).
    pub fn load(&self) -> Result<T, SidecarError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|source| SidecarError::Parse { path: self.display_path(), source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(source) => Err(SidecarError::Read { path: self.display_path(), source }),
        }
    }

    pub fn save(&self, value: &T) -> Result<(), SidecarError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.path, &bytes)
            .map_err(|source| SidecarError::Write { path: self.display_path(), source })?;
        tracing::debug!(path = %self.path.display(), "sidecar saved");
        Ok(())
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "sidecar_tests.rs"]
mod tests;
