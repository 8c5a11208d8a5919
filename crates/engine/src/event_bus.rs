// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide typed pub/sub. `emit` never blocks the caller; each
//! subscriber has a bounded queue and a monotonic drop counter.

use mg_core::Event;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const DEFAULT_SUBSCRIBER_CAPACITY: usize = 25;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
    dropped: Arc<AtomicUsize>,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `event` to every live subscriber. Full queues drop
    /// the event for that subscriber and increment its counter; the
    /// publisher is never delayed by a slow consumer.
    pub fn emit(&self, event: Event) {
        let subscribers = self.subscribers.lock();
        for sub in subscribers.iter() {
            match sub.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    sub.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(subscriber_id = sub.id, kind = event.kind(), "event bus queue full, dropping");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Subscribes with the default queue capacity, auto-unsubscribing
    /// when `ctx` is cancelled.
    pub fn subscribe(&self, ctx: CancellationToken) -> EventSubscription {
        self.subscribe_with_capacity(ctx, DEFAULT_SUBSCRIBER_CAPACITY)
    }

    pub fn subscribe_with_capacity(&self, ctx: CancellationToken, capacity: usize) -> EventSubscription {
        let (tx, rx) = mpsc::channel(capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let dropped = Arc::new(AtomicUsize::new(0));
        self.subscribers.lock().push(Subscriber { id, tx, dropped: dropped.clone() });
        EventSubscription { rx, id, dropped, ctx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Drops subscriber registrations whose channel is closed. Called
    /// from `emit` implicitly is not enough to shrink the registry (a
    /// closed sender still occupies a slot), so the manager calls this
    /// periodically, and it is also safe to call from tests.
    pub fn prune_closed(&self) {
        self.subscribers.lock().retain(|s| !s.tx.is_closed());
    }
}

/// A live subscription. Holding this alive keeps the subscriber
/// registered; drop it (or let `ctx` cancel) to stop receiving.
pub struct EventSubscription {
    rx: mpsc::Receiver<Event>,
    id: u64,
    dropped: Arc<AtomicUsize>,
    ctx: CancellationToken,
}

impl EventSubscription {
    /// Waits for the next event, or returns `None` once `ctx` cancels.
    pub async fn recv(&mut self) -> Option<Event> {
        tokio::select! {
            _ = self.ctx.cancelled() => None,
            evt = self.rx.recv() => evt,
        }
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
