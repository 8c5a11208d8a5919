// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! mg-wire: JSON DTOs crossing the HTTP/SSE boundary between
//! `mg-daemon` and callers. Deliberately does not carry the teacher's
//! length-prefixed binary framing (`mg-daemon`'s original
//! `protocol::wire` module) — HTTP plus JSON/SSE replaces it entirely.

use mg_core::{DownloadRecord, Event, GroupId, ModelId, ProcessState};
use serde::{Deserialize, Serialize};

/// `{"error": "..."}` — the shape of every failed JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// `GET /v1/models` entry. Listed models only — `unlisted` models are
/// excluded upstream of this type ever being constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListEntry {
    pub id: ModelId,
    pub object: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ModelListEntry {
    pub fn new(id: ModelId, aliases: Vec<String>) -> Self {
        Self { id, object: "model", aliases }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelListResponse {
    pub object: &'static str,
    pub data: Vec<ModelListEntry>,
}

impl ModelListResponse {
    pub fn new(data: Vec<ModelListEntry>) -> Self {
        Self { object: "list", data }
    }
}

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_total: usize,
    pub models_loaded: usize,
    pub timestamp: u64,
}

/// One entry of `GET /running`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningModel {
    pub id: ModelId,
    pub group_id: Option<GroupId>,
    pub state: ProcessState,
    pub port: u16,
    pub inflight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningResponse {
    pub models: Vec<RunningModel>,
}

/// Snapshot delivered as the first SSE frame of `GET /api/events`,
/// before the stream switches to live [`Event`] envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsSnapshot {
    pub running: Vec<RunningModel>,
    pub log_history: Vec<LogHistoryEntry>,
    pub downloads: Vec<DownloadRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHistoryEntry {
    pub model_id: ModelId,
    /// UTF-8 lossy rendering of the model's log ring buffer at
    /// subscribe time; binary-safe capture lives in `mg-engine`.
    pub lines: String,
}

/// Serializes an [`Event`] as a single SSE `data:` frame, including the
/// trailing blank line that terminates it.
pub fn sse_frame(event: &Event) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(event)?;
    Ok(format!("data: {json}\n\n"))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
