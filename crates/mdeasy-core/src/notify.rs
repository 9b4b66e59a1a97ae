//! Change notification for connected viewers.
//!
//! The bus pairs a [`Notify`] with the shared [`VersionCounter`]. The counter
//! is the source of truth: a wake-up only tells a waiter to look again, and a
//! waiter reports a change only when the generation differs from the one it
//! last saw.
//!
//! # Wake-up ordering
//!
//! A waiter creates its `Notified` future before reading the counter, so a
//! `publish` that lands between the read and the sleep still wakes it. A
//! `publish` that lands between the increment and the broadcast is seen by
//! the read directly.
//!
//! # Keep-alive
//!
//! `wait_for_change` gives up after `timeout` with [`Outcome::TimedOut`]. The
//! stream layer emits a heartbeat and waits again with the same generation,
//! so idle connections are not dropped by proxies.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, timeout_at};

use crate::version::{Generation, VersionCounter};

/// Heartbeat interval in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Result of waiting for the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The generation differs from the caller's; carries the current one.
    Changed(Generation),
    /// Nothing changed before the timeout.
    TimedOut,
}

/// Broadcast wake-up for every observer waiting on a generation change.
///
/// Cheap to clone; clones share the counter and the waiter list.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    inner: Arc<BusInner>,
}

#[derive(Debug)]
struct BusInner {
    counter: Arc<VersionCounter>,
    notify: Notify,
    waiters: AtomicUsize,
}

impl NotificationBus {
    /// Create a bus over a shared counter.
    pub fn new(counter: Arc<VersionCounter>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                counter,
                notify: Notify::new(),
                waiters: AtomicUsize::new(0),
            }),
        }
    }

    /// The counter this bus reports on.
    pub fn counter(&self) -> &Arc<VersionCounter> {
        &self.inner.counter
    }

    /// Latest committed generation.
    pub fn current(&self) -> Generation {
        self.inner.counter.current()
    }

    /// Bump the generation and wake every waiter.
    pub fn publish(&self) -> Generation {
        let generation = self.inner.counter.bump();
        self.signal();

        tracing::debug!(
            generation,
            waiters = self.waiter_count(),
            "Published new generation"
        );

        generation
    }

    /// Wake every currently blocked waiter without changing the generation.
    ///
    /// Waiters re-check the counter and go back to sleep if it is unchanged.
    pub fn signal(&self) {
        self.inner.notify.notify_waiters();
    }

    /// Wait until the generation differs from `last_seen` or `timeout` elapses.
    ///
    /// Returns immediately when `last_seen` is already stale. Cancel-safe:
    /// dropping the future deregisters the waiter.
    pub async fn wait_for_change(&self, last_seen: Generation, timeout: Duration) -> Outcome {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let current = self.current();
            if current != last_seen {
                return Outcome::Changed(current);
            }

            if timeout_at(deadline, notified).await.is_err() {
                return Outcome::TimedOut;
            }
        }
    }

    /// Attach an observer starting at the current generation.
    pub fn subscribe(&self) -> Waiter {
        self.subscribe_from(self.current())
    }

    /// Attach an observer that last saw `generation`.
    ///
    /// Used for reconnecting clients; a stale generation yields a change on
    /// the first [`Waiter::next`].
    pub fn subscribe_from(&self, generation: Generation) -> Waiter {
        self.inner.waiters.fetch_add(1, Ordering::Relaxed);
        Waiter {
            bus: self.clone(),
            last_seen: generation,
        }
    }

    /// Number of attached observers.
    pub fn waiter_count(&self) -> usize {
        self.inner.waiters.load(Ordering::Relaxed)
    }
}

/// One attached observer.
///
/// Tracks the last generation it reported so each change is delivered once.
/// Dropping it detaches the observer.
#[derive(Debug)]
pub struct Waiter {
    bus: NotificationBus,
    last_seen: Generation,
}

impl Waiter {
    /// Last generation this observer was told about.
    pub fn last_seen(&self) -> Generation {
        self.last_seen
    }

    /// Wait for the next generation this observer has not seen.
    pub async fn next(&mut self, timeout: Duration) -> Outcome {
        let outcome = self.bus.wait_for_change(self.last_seen, timeout).await;
        if let Outcome::Changed(generation) = outcome {
            self.last_seen = generation;
        }
        outcome
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.bus.inner.waiters.fetch_sub(1, Ordering::Relaxed);
    }
}
