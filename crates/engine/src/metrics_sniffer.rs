// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extracts token-timing records from `text/event-stream` response
//! bodies as they pass through the proxy, without altering the bytes
//! forwarded to the client.

use mg_core::{ModelId, TokenMetrics};
use serde_json::Value;

/// Stateful scanner fed one response chunk at a time. Frames that
/// straddle a chunk boundary are buffered until the terminating blank
/// line arrives.
pub struct MetricsSniffer {
    model_id: ModelId,
    buffer: String,
    now_epoch_ms: fn() -> u64,
}

impl MetricsSniffer {
    pub fn new(model_id: ModelId) -> Self {
        Self { model_id, buffer: String::new(), now_epoch_ms: default_epoch_ms }
    }

    #[cfg(test)]
    fn with_clock(model_id: ModelId, now_epoch_ms: fn() -> u64) -> Self {
        Self { model_id, buffer: String::new(), now_epoch_ms }
    }

    /// Feeds the next chunk of response bytes. Returns every
    /// `TokenMetrics` record recognized in complete frames contained in
    /// `chunk` plus any carried-over partial frame.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<TokenMetrics> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut out = Vec::new();

        while let Some(frame_end) = self.buffer.find("\n\n") {
            let frame = self.buffer[..frame_end].to_string();
            self.buffer.drain(..frame_end + 2);
            if let Some(metrics) = self.parse_frame(&frame) {
                out.push(metrics);
            }
        }

        out
    }

    fn parse_frame(&self, frame: &str) -> Option<TokenMetrics> {
        let data = frame.strip_prefix("data: ").or_else(|| frame.strip_prefix("data:"))?.trim();
        let json: Value = serde_json::from_str(data).ok()?;
        let timings = json.get("timings")?;
        let prompt_n = timings.get("prompt_n")?.as_u64()?;
        let prompt_ms = timings.get("prompt_ms")?.as_f64()?;
        let predicted_n = timings.get("predicted_n")?.as_u64()?;
        let predicted_ms = timings.get("predicted_ms")?.as_f64()?;

        Some(TokenMetrics {
            model_id: self.model_id.clone(),
            prompt_tokens: prompt_n,
            predict_tokens: predicted_n,
            prompt_ms,
            predict_ms: predicted_ms,
            ts_epoch_ms: (self.now_epoch_ms)(),
        })
    }
}

fn default_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "metrics_sniffer_tests.rs"]
mod tests;
