//! Worker pool and per-task handling
//!
//! Every worker shares one [`CrawlContext`]: the immutable crawl settings, the
//! task queue, the outstanding-work counter, both membership filters, the
//! request semaphore, the link source and the output sink.

use crate::config::CrawlConfig;
use crate::crawler::counter::WorkCounter;
use crate::crawler::fetcher::LinkSource;
use crate::crawler::filter::MembershipFilter;
use crate::crawler::policy::{self, Rejection};
use crate::crawler::queue::{Task, TaskQueue};
use crate::output::{CrawlStats, LinkSink};
use crate::url::fetch_key;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// State shared by the coordinator and every worker
pub(crate) struct CrawlContext {
    pub(crate) config: CrawlConfig,
    pub(crate) queue: TaskQueue,
    pub(crate) counter: WorkCounter,
    /// URLs already taken for fetching, keyed without fragment
    pub(crate) processed: MembershipFilter,
    /// Links already written to the sink
    pub(crate) printed: MembershipFilter,
    /// Bounds simultaneous fetches independently of the worker count
    pub(crate) request_limit: Semaphore,
    pub(crate) source: Arc<dyn LinkSource>,
    pub(crate) sink: Arc<dyn LinkSink>,
    /// Set once the sink fails; remaining tasks are drained without fetching
    pub(crate) output_closed: AtomicBool,
    pub(crate) stats: CrawlStats,
}

impl CrawlContext {
    /// Counts a task as outstanding, then queues it
    ///
    /// The count is raised before the task can be observed by any worker, and
    /// callers submit children while their own task is still outstanding, so
    /// the counter cannot touch zero while children are pending.
    pub(crate) fn submit(&self, task: Task) {
        if let Err(e) = self.counter.add(1) {
            tracing::error!(url = %task.url, "Dropping task: {}", e);
            return;
        }

        match self.queue.send(task) {
            Ok(()) => self.stats.record_enqueued(),
            Err(closed) => {
                tracing::error!(url = %closed.0.url, "Dropping task: {}", closed);
                self.counter.done();
            }
        }
    }

    /// Handles one task to completion
    ///
    /// Never fails: every problem is logged here and the task is dropped.
    async fn handle_task(&self, task: Task) {
        if self.output_closed.load(Ordering::Acquire) {
            return;
        }

        if task.is_exhausted() {
            self.stats.record_depth_exhausted();
            return;
        }

        if !self.processed.insert_if_absent(fetch_key(&task.url)) {
            tracing::trace!(url = %task.url, "Already processed");
            self.stats.record_duplicate();
            return;
        }

        let url = match policy::check(&task.url, task.remaining_depth, &self.config) {
            Ok(url) => url,
            Err(rejection) => {
                self.report_rejection(&task, &rejection);
                return;
            }
        };

        let fetched = {
            let Ok(_permit) = self.request_limit.acquire().await else {
                tracing::error!(url = %url, "Request semaphore closed");
                return;
            };
            tracing::debug!(url = %url, depth = task.remaining_depth, "Fetching");
            self.source.fetch_and_extract(&url).await
        };

        let links = match fetched {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(url = %url, "Error processing {}: {}", url, e);
                self.stats.record_fetch_error();
                return;
            }
        };
        self.stats.record_fetch(links.len());

        for link in &links {
            if self.printed.insert_if_absent(link) {
                if let Err(e) = self.sink.emit(link) {
                    self.close_output(&e);
                    return;
                }
                self.stats.record_printed();
            }
        }

        for link in links {
            self.submit(task.child(link));
        }
    }

    fn close_output(&self, error: &std::io::Error) {
        if !self.output_closed.swap(true, Ordering::AcqRel) {
            if error.kind() == std::io::ErrorKind::BrokenPipe {
                tracing::info!("Link output closed, stopping crawl");
            } else {
                tracing::error!("Failed to write link output, stopping crawl: {}", error);
            }
        }
    }

    fn report_rejection(&self, task: &Task, rejection: &Rejection) {
        self.stats.record_rejected();
        if rejection.is_error() {
            tracing::warn!(url = %task.url, "Error processing {}: {}", task.url, rejection);
        } else {
            tracing::trace!(url = %task.url, "Not fetching: {}", rejection);
        }
    }
}

/// Runs one worker until the queue is closed and drained
///
/// Each task is handled on its own spawned task, so a panic while handling
/// one URL is reported and the worker moves on to the next.
pub(crate) async fn run_worker(id: usize, ctx: Arc<CrawlContext>) {
    tracing::trace!(worker = id, "Worker started");

    while let Some(task) = ctx.queue.recv().await {
        // Dropped last, after any children have been counted
        let _done = ctx.counter.complete_on_drop();
        ctx.stats.record_task();

        let url = task.url.clone();
        let handler = Arc::clone(&ctx);
        if let Err(e) = tokio::spawn(async move { handler.handle_task(task).await }).await {
            tracing::error!(worker = id, url = %url, "Error processing {}: {}", url, e);
            if e.is_panic() {
                ctx.stats.record_handler_panic();
            }
        }
    }

    tracing::trace!(worker = id, "Task queue closed, worker exiting");
}
