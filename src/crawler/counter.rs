//! Outstanding-work counter
//!
//! Counts tasks that were submitted but are not yet fully handled. Each
//! submission adds one before the task becomes visible to a consumer, and each
//! handled task subtracts one as the very last thing done for it. The crawl is
//! finished exactly when the count first returns to zero after seeding.

use crate::CrawlError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counter with a zero-detecting wait
#[derive(Debug, Default)]
pub struct WorkCounter {
    outstanding: AtomicUsize,
    drained: AtomicBool,
    idle: Notify,
}

impl WorkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` units of outstanding work
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::CounterDrained` if the counter has already
    /// returned to zero; the count is left untouched in that case.
    pub fn add(&self, n: usize) -> Result<(), CrawlError> {
        if self.drained.load(Ordering::Acquire) {
            return Err(CrawlError::CounterDrained);
        }
        self.outstanding.fetch_add(n, Ordering::AcqRel);
        Ok(())
    }

    /// Marks one unit of work as finished
    ///
    /// The call that brings the count to zero wakes every waiter.
    pub fn done(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                self.drained.store(true, Ordering::Release);
                self.idle.notify_waiters();
            }
            Ok(_) => {}
            Err(_) => tracing::error!("Outstanding work counter decremented below zero"),
        }
    }

    /// Returns a guard that calls [`done`](Self::done) when dropped
    ///
    /// Dropping happens on every exit path, including early returns and
    /// unwinding, so a handled task is always counted as finished.
    pub fn complete_on_drop(&self) -> CompletionGuard<'_> {
        CompletionGuard { counter: self }
    }

    /// Current outstanding count
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Returns true once the count has returned to zero
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::Acquire)
    }

    /// Waits until no work is outstanding
    ///
    /// Returns immediately if the count is already zero.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent notify is not missed
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements a [`WorkCounter`] when dropped
#[must_use = "the task is counted as finished as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CompletionGuard<'a> {
    counter: &'a WorkCounter,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.counter.done();
    }
}
