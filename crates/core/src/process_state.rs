// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process lifecycle vocabulary shared by `mg-engine`, `mg-wire`, and
//! `mg-daemon` — kept here so the wire DTOs and the state machine agree on
//! one type instead of two that have to stay in sync by hand.

use serde::{Deserialize, Serialize};

/// A supervised model process's lifecycle state. `Shutdown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Stopped,
    Starting,
    Ready,
    Stopping,
    Shutdown,
    Failed,
}

crate::simple_display! {
    ProcessState {
        Stopped => "stopped",
        Starting => "starting",
        Ready => "ready",
        Stopping => "stopping",
        Shutdown => "shutdown",
        Failed => "failed",
    }
}

impl ProcessState {
    /// Whether this state accepts new proxied requests.
    pub fn accepts_requests(&self) -> bool {
        matches!(self, ProcessState::Ready | ProcessState::Starting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Shutdown)
    }
}

/// How a `Stop` should be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStrategy {
    /// Signal immediately; escalate to a hard kill after a grace period.
    /// Does not wait for in-flight requests.
    Immediately,
    /// Refuse new requests, wait for `inflight == 0` up to a drain
    /// deadline, then proceed as `Immediately`.
    WaitForInflightRequest,
    /// Internal idle-timeout trigger; behaves like
    /// `WaitForInflightRequest` but only engages when already idle.
    IdleTimeout,
}

#[cfg(test)]
#[path = "process_state_tests.rs"]
mod tests;
