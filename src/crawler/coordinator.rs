//! Crawler coordinator - crawl orchestration and termination
//!
//! The coordinator owns the whole run:
//! - Validating the seed URL before anything else is built
//! - Building the shared filters, queue, counter and request semaphore
//! - Seeding the first task and starting the worker pool
//! - Waiting for the outstanding-work counter to reach zero
//! - Closing the queue and joining every worker

use crate::config::{validate, Config, CrawlConfig};
use crate::crawler::counter::WorkCounter;
use crate::crawler::fetcher::{HttpFetcher, LinkSource};
use crate::crawler::filter::MembershipFilter;
use crate::crawler::queue::{Task, TaskQueue};
use crate::crawler::worker::{run_worker, CrawlContext};
use crate::output::{CrawlStatistics, CrawlStats, LinkSink, StdoutSink};
use crate::state::CrawlPhase;
use crate::CrawlError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: Url,
    ctx: Arc<CrawlContext>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a coordinator for a crawl starting at `start_url`
    ///
    /// # Arguments
    ///
    /// * `start_url` - The seed URL
    /// * `config` - Validated crawler, HTTP and filter settings
    /// * `source` - Fetch-and-extract collaborator
    /// * `sink` - Destination for discovered links
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The configuration is invalid, the seed URL is
    ///   malformed or has no host, or a filter could not be sized
    pub fn new(
        start_url: &str,
        config: &Config,
        source: Arc<dyn LinkSource>,
        sink: Arc<dyn LinkSink>,
    ) -> Result<Self, CrawlError> {
        validate(config)?;

        let seed = Url::parse(start_url).map_err(|source| CrawlError::InvalidSeed {
            url: start_url.to_string(),
            source,
        })?;
        let crawl_config = CrawlConfig::for_seed(&seed, &config.crawler)?;

        let ctx = CrawlContext {
            processed: MembershipFilter::from_config("processed", &config.filter)?,
            printed: MembershipFilter::from_config("printed", &config.filter)?,
            queue: TaskQueue::new(),
            counter: WorkCounter::new(),
            request_limit: Semaphore::new(crawl_config.max_concurrent_requests),
            config: crawl_config,
            source,
            sink,
            output_closed: AtomicBool::new(false),
            stats: CrawlStats::new(),
        };

        Ok(Self {
            seed,
            ctx: Arc::new(ctx),
            phase: CrawlPhase::Idle,
        })
    }

    /// The settings every worker shares
    pub fn crawl_config(&self) -> &CrawlConfig {
        &self.ctx.config
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// 1. Counts and queues the seed task
    /// 2. Starts `worker_count` workers
    /// 3. Waits until no work is outstanding
    /// 4. Closes the queue
    /// 5. Joins every worker
    ///
    /// Per-URL failures never surface here; they are logged by the workers.
    pub async fn run(mut self) -> Result<CrawlStatistics, CrawlError> {
        let start_time = Instant::now();
        let ctx = Arc::clone(&self.ctx);
        tracing::info!(
            seed = %self.seed,
            max_depth = ctx.config.max_depth,
            workers = ctx.config.worker_count,
            max_requests = ctx.config.max_concurrent_requests,
            external_domains = ctx.config.allow_external_domains,
            "Starting crawl"
        );

        self.advance(CrawlPhase::Seeding)?;
        ctx.submit(Task::new(self.seed.as_str(), ctx.config.max_depth));

        self.advance(CrawlPhase::Running)?;
        let mut workers = JoinSet::new();
        for id in 0..ctx.config.worker_count {
            workers.spawn(run_worker(id, Arc::clone(&ctx)));
        }

        ctx.counter.wait_idle().await;

        self.advance(CrawlPhase::Draining)?;
        ctx.queue.close();

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker terminated abnormally: {}", e);
            }
        }

        self.advance(CrawlPhase::Terminated)?;
        let stats = ctx.stats.snapshot(start_time.elapsed());
        tracing::info!(
            "Crawl completed: {} pages fetched, {} unique links in {:?}",
            stats.pages_fetched,
            stats.links_printed,
            stats.elapsed
        );

        Ok(stats)
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a complete crawl over HTTP, printing links to standard output
///
/// # Example
///
/// ```no_run
/// use linkcrawl::config::Config;
/// use linkcrawl::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.max_depth = 1;
/// let stats = run_crawl("https://example.org", &config).await?;
/// println!("{} pages fetched", stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(start_url: &str, config: &Config) -> Result<CrawlStatistics, CrawlError> {
    let source = Arc::new(HttpFetcher::new(&config.http)?);
    let coordinator = Coordinator::new(start_url, config, source, Arc::new(StdoutSink))?;
    coordinator.run().await
}
