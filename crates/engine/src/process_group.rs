// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single coordinator per configured group: dispatches `ensureReady`
//! per the group's policy and serializes the swap decision.

use crate::error::GroupError;
use crate::event_bus::EventBus;
use crate::group_view::{ExclusivityNotifier, GroupView, NoopExclusivityNotifier};
use crate::port_allocator::PortAllocator;
use crate::process::{InflightGuard, Process};
use async_trait::async_trait;
use indexmap::IndexMap;
use mg_core::{Clock, GroupConfig, GroupId, GroupPolicy, ModelConfig, ModelId, ProcessState, StopStrategy, SystemClock};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

pub struct ProcessGroup<C: Clock = SystemClock> {
    pub id: GroupId,
    policy: GroupPolicy,
    exclusive: bool,
    health_check_timeout: Duration,
    members: IndexMap<ModelId, Arc<Process<C>>>,
    swap_mutex: AsyncMutex<()>,
    exclusivity_notifier: Arc<dyn ExclusivityNotifier>,
}

impl<C: Clock + 'static> ProcessGroup<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GroupConfig,
        model_configs: &IndexMap<ModelId, ModelConfig>,
        macros: &IndexMap<String, String>,
        clock: C,
        port_allocator: Arc<PortAllocator>,
        events: Arc<EventBus>,
        health_check_timeout: Duration,
        exclusivity_notifier: Arc<dyn ExclusivityNotifier>,
    ) -> Arc<Self> {
        let policy = config.policy();
        let group_id = config.id.clone();

        Arc::new_cyclic(|weak: &Weak<Self>| {
            let group_view: Arc<dyn GroupView> = Arc::new(GroupViewHandle { group: weak.clone() });
            let members = config
                .members
                .iter()
                .filter_map(|id| model_configs.get(id).cloned().map(|cfg| (id.clone(), cfg)))
                .map(|(id, cfg)| {
                    let process = Process::with_group_view(
                        group_id.clone(),
                        cfg,
                        macros.clone(),
                        clock.clone(),
                        port_allocator.clone(),
                        events.clone(),
                        group_view.clone(),
                    );
                    (id, Arc::new(process))
                })
                .collect();

            Self {
                id: group_id,
                policy,
                exclusive: config.exclusive,
                health_check_timeout,
                members,
                swap_mutex: AsyncMutex::new(()),
                exclusivity_notifier,
            }
        })
    }

    #[cfg(test)]
    fn new_with_noop_notifier(
        config: GroupConfig,
        model_configs: &IndexMap<ModelId, ModelConfig>,
        clock: C,
        port_allocator: Arc<PortAllocator>,
        events: Arc<EventBus>,
        health_check_timeout: Duration,
    ) -> Arc<Self> {
        Self::new(
            config,
            model_configs,
            &IndexMap::new(),
            clock,
            port_allocator,
            events,
            health_check_timeout,
            Arc::new(NoopExclusivityNotifier),
        )
    }

    pub fn has(&self, id: &ModelId) -> bool {
        self.members.contains_key(id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Arc<Process<C>>> {
        self.members.values()
    }

    fn member(&self, id: &ModelId) -> Result<Arc<Process<C>>, GroupError> {
        self.members.get(id).cloned().ok_or_else(|| GroupError::UnknownMember(id.to_string()))
    }

    /// Static configuration for a member, independent of its current
    /// process state. Used by `mg-proxy` to rewrite request bodies
    /// before the member is necessarily `Ready`.
    pub fn model_config(&self, id: &ModelId) -> Result<ModelConfig, GroupError> {
        Ok(self.member(id)?.config().clone())
    }

    /// Transitions the named member to `Ready`, per policy, and returns
    /// its handle.
    pub async fn ensure_ready(&self, id: &ModelId) -> Result<Arc<Process<C>>, GroupError> {
        let process = self.member(id)?;
        if process.state().accepts_requests() {
            return Ok(process);
        }

        match self.policy {
            GroupPolicy::Swap => self.swap_to(&process).await?,
            GroupPolicy::Parallel | GroupPolicy::Plain => {
                process.start_or_join(self.health_check_timeout).await?
            }
        }
        Ok(process)
    }

    /// Serializes the swap decision: while holding the lock, stop every
    /// other `Starting/Ready/Stopping` member, then release the lock
    /// and start (or join an in-flight start of) the target outside it
    /// so concurrent swaps to the same target coalesce.
    async fn swap_to(&self, target: &Arc<Process<C>>) -> Result<(), GroupError> {
        {
            let _guard = self.swap_mutex.lock().await;
            if target.state().accepts_requests() {
                return Ok(());
            }
            for (id, member) in &self.members {
                if *id == target.id {
                    continue;
                }
                if matches!(member.state(), ProcessState::Starting | ProcessState::Ready | ProcessState::Stopping) {
                    member.stop(StopStrategy::WaitForInflightRequest).await;
                }
            }
        }
        target.start_or_join(self.health_check_timeout).await?;
        Ok(())
    }

    /// Stops every member in parallel; returns once all are `Stopped`.
    pub async fn stop_all(&self, strategy: StopStrategy) {
        let futures = self.members.values().map(|p| p.stop(strategy));
        futures::future::join_all(futures).await;
    }

    /// Same as `stop_all(Immediately)`, but terminal: members reject
    /// future `start()` calls afterward.
    pub async fn shutdown(&self) {
        let futures = self.members.values().map(|p| p.shutdown());
        futures::future::join_all(futures).await;
    }

    /// Ensures the member is ready and returns it along with a held
    /// concurrency permit; releasing the guard frees the slot.
    pub async fn ensure_ready_and_acquire(&self, id: &ModelId) -> Result<(Arc<Process<C>>, InflightGuard<C>), GroupError> {
        let process = self.ensure_ready(id).await?;
        let permit = process.acquire_permit().await?;
        Ok((process, permit))
    }
}

struct GroupViewHandle<C: Clock> {
    group: Weak<ProcessGroup<C>>,
}

#[async_trait]
impl<C: Clock + 'static> GroupView for GroupViewHandle<C> {
    async fn on_member_starting(&self, _model_id: &ModelId) {
        let Some(group) = self.group.upgrade() else { return };
        if group.exclusive {
            group.exclusivity_notifier.notify_starting(&group.id).await;
        }
    }
}

#[cfg(test)]
#[path = "process_group_tests.rs"]
mod tests;
