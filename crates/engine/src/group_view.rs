// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow capability a [`crate::process::Process`] holds back onto
//! its [`crate::process_group::ProcessGroup`] (and, transitively, onto
//! whatever owns sibling groups). Never a full owning handle: a
//! `Process` cannot iterate its group's members or reach other groups
//! directly.

use async_trait::async_trait;
use mg_core::{GroupId, ModelId};

/// Start/stop notifications a `Process` sends to its group.
#[async_trait]
pub trait GroupView: Send + Sync {
    /// Called once the process has transitioned to `Starting`, before
    /// the readiness probe is armed. Must resolve before `start()`
    /// continues, so an exclusive group's sibling-stop fan-out is fully
    /// serialized ahead of this member ever reaching `Ready`.
    async fn on_member_starting(&self, model_id: &ModelId);
}

/// Used by a standalone `Process` (tests, or a group with no
/// exclusivity concerns) when no notification is needed.
pub struct NoopGroupView;

#[async_trait]
impl GroupView for NoopGroupView {
    async fn on_member_starting(&self, _model_id: &ModelId) {}
}

/// The capability a `ProcessGroup` holds one level further up: how to
/// ask whatever owns the full set of groups to stop every non-persistent
/// sibling. Only groups with `exclusive = true` use this.
#[async_trait]
pub trait ExclusivityNotifier: Send + Sync {
    async fn notify_starting(&self, group_id: &GroupId);
}

pub struct NoopExclusivityNotifier;

#[async_trait]
impl ExclusivityNotifier for NoopExclusivityNotifier {
    async fn notify_starting(&self, _group_id: &GroupId) {}
}
