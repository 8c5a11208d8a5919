// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Download record shape shared between the `Downloader` collaborator
//! trait (`mg-adapters`) and the manager's reconfigure-on-completion path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    DownloadStatus {
        Queued => "queued",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: String,
    pub file_path: String,
    pub status: DownloadStatus,
    pub bytes_total: u64,
    pub bytes_done: u64,
}

impl DownloadRecord {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            DownloadStatus::Completed | DownloadStatus::Failed | DownloadStatus::Cancelled
        )
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct DownloadRecordBuilder => DownloadRecord {
        into {
            id: String = "dl-1",
            file_path: String = "/models/test.gguf"
        }
        set {
            status: DownloadStatus = DownloadStatus::Queued,
            bytes_total: u64 = 0,
            bytes_done: u64 = 0
        }
    }
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
