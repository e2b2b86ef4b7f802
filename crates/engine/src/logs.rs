// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, time-debounced log aggregation.
//!
//! The aggregator buffers structured log entries from in-flight commands
//! and republishes them to observers at a controlled rate: a burst of
//! ingests inside one cadence window coalesces into a single publish,
//! scheduled cadence-ms after the last ingest of the burst (trailing-edge
//! debounce). Under a continuous output stream the visible snapshot lags
//! until the stream pauses, trading live-ness for update-rate control.
//!
//! One aggregator is created at application start and handed by clone to
//! everything that ingests or observes; there is no global lookup.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use toolup_core::{Clock, LogEntry, LogLevel, SystemClock};

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(1000);

struct State {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    cadence: Duration,
    /// Bumped on every mutation; a pending publish only lands if it still
    /// holds the latest generation, which gives the cancel-and-reschedule
    /// debounce without timer-handle bookkeeping.
    generation: u64,
}

struct Inner {
    state: Mutex<State>,
    published: watch::Sender<Arc<Vec<LogEntry>>>,
}

impl Inner {
    fn publish_if_current(&self, generation: u64) {
        let snapshot = {
            let state = self.state.lock();
            if state.generation != generation {
                return;
            }
            Arc::new(state.entries.iter().cloned().collect::<Vec<_>>())
        };
        // Wholesale replacement: observers holding an earlier snapshot
        // never see it mutate.
        self.published.send_replace(snapshot);
    }
}

/// Shared handle to the process-wide log buffer.
///
/// Clones share the same buffer. Must be used from within a tokio runtime;
/// each ingest schedules its debounced publish on the current runtime.
pub struct LogAggregator<C: Clock = SystemClock> {
    inner: Arc<Inner>,
    clock: C,
}

impl<C: Clock> Clone for LogAggregator<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), clock: self.clock.clone() }
    }
}

impl LogAggregator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for LogAggregator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LogAggregator<C> {
    pub fn with_clock(clock: C) -> Self {
        let (published, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    entries: VecDeque::new(),
                    capacity: DEFAULT_CAPACITY,
                    cadence: DEFAULT_CADENCE,
                    generation: 0,
                }),
                published,
            }),
            clock,
        }
    }

    /// Append an entry timestamped with the aggregator's clock.
    pub fn ingest(&self, source: &str, message: &str, level: LogLevel) {
        self.ingest_at(source, message, level, self.clock.now_ms());
    }

    /// Append an entry with an explicit timestamp, evict from the front to
    /// stay within capacity, and restart the publish debounce.
    pub fn ingest_at(&self, source: &str, message: &str, level: LogLevel, timestamp: u64) {
        let (generation, cadence) = {
            let mut state = self.inner.state.lock();
            state.entries.push_back(LogEntry::new(timestamp, source, message, level));
            while state.entries.len() > state.capacity {
                state.entries.pop_front();
            }
            state.generation += 1;
            (state.generation, state.cadence)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(cadence).await;
            inner.publish_if_current(generation);
        });
    }

    /// The most recently published snapshot. Monotonically ahead-or-equal
    /// to any earlier snapshot except across [`clear`](Self::clear).
    pub fn snapshot(&self) -> Arc<Vec<LogEntry>> {
        self.inner.published.borrow().clone()
    }

    /// Observe snapshot publications reactively.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<LogEntry>>> {
        self.inner.published.subscribe()
    }

    /// Copy of the working list, including entries not yet published.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.state.lock().entries.iter().cloned().collect()
    }

    /// Empty the working list and the published snapshot synchronously,
    /// discarding any pending debounced publish.
    pub fn clear(&self) {
        {
            let mut state = self.inner.state.lock();
            state.entries.clear();
            state.generation += 1;
        }
        self.inner.published.send_replace(Arc::new(Vec::new()));
    }

    /// Adjust capacity and publish cadence. Truncates the working list to
    /// the new capacity and republishes immediately; any pending debounced
    /// publish is discarded.
    pub fn configure(&self, capacity: usize, cadence: Duration) {
        let snapshot = {
            let mut state = self.inner.state.lock();
            state.capacity = capacity;
            state.cadence = cadence;
            while state.entries.len() > state.capacity {
                state.entries.pop_front();
            }
            state.generation += 1;
            Arc::new(state.entries.iter().cloned().collect::<Vec<_>>())
        };
        self.inner.published.send_replace(snapshot);
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
