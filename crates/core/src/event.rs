// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event bus payload vocabulary. Every variant here is what a
//! `mg-engine::EventBus` subscriber receives and what `mg-wire` serializes
//! onto the SSE fan-out.

use crate::group::GroupId;
use crate::model::ModelId;
use crate::process_state::ProcessState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub model_id: ModelId,
    pub prompt_tokens: u64,
    pub predict_tokens: u64,
    pub prompt_ms: f64,
    pub predict_ms: f64,
    pub ts_epoch_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    ProcessStateChanged {
        model_id: ModelId,
        group_id: GroupId,
        from: ProcessState,
        to: ProcessState,
    },
    TokenMetrics(TokenMetrics),
    #[serde(rename_all = "camelCase")]
    DownloadProgress {
        download_id: String,
        bytes_total: u64,
        bytes_done: u64,
    },
    ConfigChanged {
        reloading: bool,
    },
    #[serde(rename_all = "camelCase")]
    ModelPreloaded {
        model_id: ModelId,
        ok: bool,
    },
}

impl Event {
    /// The `type` discriminant as it appears on the wire, e.g. for
    /// per-kind subscriber filtering or logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ProcessStateChanged { .. } => "process_state_changed",
            Event::TokenMetrics(_) => "token_metrics",
            Event::DownloadProgress { .. } => "download_progress",
            Event::ConfigChanged { .. } => "config_changed",
            Event::ModelPreloaded { .. } => "model_preloaded",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
