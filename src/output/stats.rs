//! Crawl statistics
//!
//! Workers bump lock-free counters in [`CrawlStats`] as they handle tasks. The
//! coordinator takes a [`CrawlStatistics`] snapshot once the pool has exited.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    tasks_handled: AtomicU64,
    depth_exhausted: AtomicU64,
    duplicates_skipped: AtomicU64,
    policy_rejected: AtomicU64,
    pages_fetched: AtomicU64,
    fetch_errors: AtomicU64,
    links_discovered: AtomicU64,
    links_printed: AtomicU64,
    tasks_enqueued: AtomicU64,
    handler_panics: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_task(&self) {
        self.tasks_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_depth_exhausted(&self) {
        self.depth_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.policy_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self, links_found: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.links_discovered
            .fetch_add(links_found as u64, Ordering::Relaxed);
    }

    pub fn record_fetch_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_printed(&self) {
        self.links_printed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued(&self) {
        self.tasks_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_panic(&self) {
        self.handler_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters
    pub fn snapshot(&self, elapsed: Duration) -> CrawlStatistics {
        CrawlStatistics {
            tasks_handled: self.tasks_handled.load(Ordering::Relaxed),
            depth_exhausted: self.depth_exhausted.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            policy_rejected: self.policy_rejected.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_printed: self.links_printed.load(Ordering::Relaxed),
            tasks_enqueued: self.tasks_enqueued.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Tasks taken off the queue (including the seed)
    pub tasks_handled: u64,

    /// Tasks dropped because their depth budget was spent
    pub depth_exhausted: u64,

    /// Tasks skipped because their URL was already processed
    pub duplicates_skipped: u64,

    /// Tasks rejected by the crawl policy
    pub policy_rejected: u64,

    /// Successful fetch-and-extract calls
    pub pages_fetched: u64,

    /// Failed fetch-and-extract calls
    pub fetch_errors: u64,

    /// Links returned by successful fetches, duplicates included
    pub links_discovered: u64,

    /// Unique links written to the sink
    pub links_printed: u64,

    /// Tasks submitted to the queue, seed included
    pub tasks_enqueued: u64,

    /// Tasks whose handler panicked
    pub handler_panics: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Fetch attempts, successful or not
    pub fn fetch_attempts(&self) -> u64 {
        self.pages_fetched + self.fetch_errors
    }

    /// Pages fetched per second over the whole run
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_fetched as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints crawl statistics to standard error
///
/// Standard output carries the discovered links, so the summary goes to
/// standard error to keep the link stream clean.
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");
    eprintln!("Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    eprintln!(
        "Pages fetched: {} ({:.2} pages/sec)",
        stats.pages_fetched,
        stats.pages_per_second()
    );
    eprintln!("Fetch errors: {}", stats.fetch_errors);
    eprintln!("Links discovered: {}", stats.links_discovered);
    eprintln!("Unique links printed: {}", stats.links_printed);

    eprintln!("\nTasks:");
    eprintln!("  Handled: {}", stats.tasks_handled);
    eprintln!("  Enqueued: {}", stats.tasks_enqueued);
    eprintln!("  Depth exhausted: {}", stats.depth_exhausted);
    eprintln!("  Already processed: {}", stats.duplicates_skipped);
    eprintln!("  Rejected by policy: {}", stats.policy_rejected);
    if stats.handler_panics > 0 {
        eprintln!("  Panicked: {}", stats.handler_panics);
    }
}
