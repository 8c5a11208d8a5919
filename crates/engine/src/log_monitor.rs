// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tee-style capture of a subprocess's stdout/stderr: a rolling ring
//! buffer plus fan-out to subscribers, neither of which can stall the
//! writer.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const DEFAULT_HISTORY_LINES: usize = 10_000;
const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Vec<u8>>,
    dropped: Arc<AtomicUsize>,
}

/// Captures byte writes from a model process, keeping a bounded
/// history and fanning each write out to subscribers without ever
/// blocking the writer on a slow reader.
pub struct LogMonitor {
    history: Mutex<VecDeque<u8>>,
    history_cap_bytes: usize,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    level: Mutex<LogLevel>,
}

impl LogMonitor {
    pub fn new() -> Self {
        Self::with_history_lines(DEFAULT_HISTORY_LINES)
    }

    pub fn with_history_lines(lines: usize) -> Self {
        // Rough bound: assume ~200 bytes/line on average, same shape as
        // other ring buffers in this codebase that size by byte count.
        Self {
            history: Mutex::new(VecDeque::new()),
            history_cap_bytes: lines.saturating_mul(200).max(4096),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(0),
            level: Mutex::new(LogLevel::Info),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.lock() = level;
    }

    pub fn level(&self) -> LogLevel {
        *self.level.lock()
    }

    /// Appends `bytes` to history and fans out to subscribers.
    /// Non-blocking: a subscriber whose queue is full has this write
    /// dropped for it and its drop counter incremented, but the call
    /// itself never waits.
    pub fn write(&self, bytes: &[u8]) {
        {
            let mut history = self.history.lock();
            history.extend(bytes.iter().copied());
            while history.len() > self.history_cap_bytes {
                history.pop_front();
            }
        }

        let subscribers = self.subscribers.lock();
        for sub in subscribers.iter() {
            match sub.tx.try_send(bytes.to_vec()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    sub.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(subscriber_id = sub.id, "log subscriber queue full, dropping chunk");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Registers a subscriber, returning the receiving half and a
    /// handle whose `Drop` unsubscribes.
    pub fn subscribe(&self) -> (mpsc::Receiver<Vec<u8>>, SubscriptionHandle<'_>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let dropped = Arc::new(AtomicUsize::new(0));
        self.subscribers.lock().push(Subscriber { id, tx, dropped: dropped.clone() });
        (rx, SubscriptionHandle { monitor: self, id, dropped })
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    /// Snapshot of the retained history.
    pub fn history(&self) -> Vec<u8> {
        self.history.lock().iter().copied().collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop guard returned by [`LogMonitor::subscribe`]; unsubscribes on
/// drop so a cancelled SSE client doesn't leak a queue forever.
pub struct SubscriptionHandle<'a> {
    monitor: &'a LogMonitor,
    id: u64,
    dropped: Arc<AtomicUsize>,
}

impl SubscriptionHandle<'_> {
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for SubscriptionHandle<'_> {
    fn drop(&mut self) {
        self.monitor.unsubscribe(self.id);
    }
}

#[cfg(test)]
#[path = "log_monitor_tests.rs"]
mod tests;
