// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file writes with rotated backups: write to a temp file in the
//! same directory, rotate any existing file through `.bak`/`.bak.2`/
//! `.bak.3`, then rename the temp file into place.

use std::io;
use std::path::{Path, PathBuf};

pub const MAX_BAK_FILES: u32 = 3;

/// Returns the `.bak`, `.bak.2`, ... path for generation `n` (1-indexed).
pub fn rotate_bak_path(path: &Path, generation: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    if generation <= 1 {
        name.push(".bak");
    } else {
        name.push(format!(".bak.{generation}"));
    }
    PathBuf::from(name)
}

/// Shifts any existing backup chain up by one generation, dropping the
/// oldest beyond [`MAX_BAK_FILES`], then backs up the current file (if
/// it exists) into `.bak`.
fn rotate_backups(path: &Path) -> io::Result<()> {
    for gen in (1..MAX_BAK_FILES).rev() {
        let from = rotate_bak_path(path, gen);
        let to = rotate_bak_path(path, gen + 1);
        if from.exists() {
            std::fs::rename(&from, &to)?;
        }
    }
    if path.exists() {
        std::fs::rename(path, rotate_bak_path(path, 1))?;
    }
    Ok(())
}

/// Writes `bytes` to `path` atomically: backup rotation, write to a
/// sibling temp file, then rename over the target. The rename is the
/// only operation that can be observed mid-write by a concurrent
/// reader, and it is atomic on the same filesystem.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    rotate_backups(path)?;

    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("sidecar")
    ));
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
