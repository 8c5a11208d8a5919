// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Downloader` collaborator: manages model-file downloads and
//! reports completion so the manager can trigger a reconfigure.
//!
//! `NullDownloader` is an in-memory stand-in sufficient to exercise the
//! manager's reconfigure-on-completion path in tests without a real
//! download backend.

use async_trait::async_trait;
use mg_core::{DownloadRecord, DownloadStatus};

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Enqueues a download and returns immediately with its initial
    /// record; completion is reported out-of-band via the event bus in
    /// the real implementation, but `NullDownloader` resolves inline.
    async fn enqueue(&self, id: String, file_path: String) -> DownloadRecord;
}

#[derive(Debug, Default)]
pub struct NullDownloader;

#[async_trait]
impl Downloader for NullDownloader {
    async fn enqueue(&self, id: String, file_path: String) -> DownloadRecord {
        tracing::info!(download_id = %id, "download backend not implemented; completing with zero bytes");
        DownloadRecord {
            id,
            file_path,
            status: DownloadStatus::Completed,
            bytes_total: 0,
            bytes_done: 0,
        }
    }
}

#[cfg(test)]
#[path = "downloader_tests.rs"]
mod tests;
