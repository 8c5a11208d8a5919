// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision and scheduling: spawns model-server child
//! processes on demand, probes readiness, enforces concurrency limits,
//! and coordinates swap/parallel/plain group policies.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod event_bus;
pub mod group_view;
pub mod log_monitor;
pub mod metrics_sniffer;
pub mod port_allocator;
pub mod process;
pub mod process_group;

pub use error::{GroupError, ProcessError};
pub use event_bus::{EventBus, EventSubscription};
pub use group_view::{ExclusivityNotifier, GroupView, NoopExclusivityNotifier, NoopGroupView};
pub use log_monitor::{LogLevel, LogMonitor, SubscriptionHandle};
pub use metrics_sniffer::MetricsSniffer;
pub use port_allocator::PortAllocator;
pub use process::{InflightGuard, Process};
pub use process_group::ProcessGroup;
