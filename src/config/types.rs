use crate::url::host_key;
use crate::CrawlError;
use serde::Deserialize;
use url::Url;

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 10;

/// Main configuration structure for Linkcrawl
///
/// Every section and key is optional; missing values take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub filter: FilterConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of hops to follow from the seed
    pub max_depth: i32,

    /// Number of workers handling tasks concurrently
    pub workers: usize,

    /// Maximum number of HTTP requests in flight at once
    ///
    /// Falls back to the worker count when unset.
    pub max_concurrent_requests: Option<usize>,

    /// Follow links that leave the seed's host
    pub external_domains: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            workers: DEFAULT_WORKERS,
            max_concurrent_requests: None,
            external_domains: false,
        }
    }
}

impl CrawlerConfig {
    /// Returns the effective request concurrency limit
    pub fn request_limit(&self) -> usize {
        self.max_concurrent_requests.unwrap_or(self.workers)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Total request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("linkcrawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Sizing of the de-duplication filters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Expected number of distinct URLs
    pub capacity: usize,

    /// Target false-positive probability at full capacity
    pub false_positive_rate: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            false_positive_rate: 0.0001,
        }
    }
}

/// Immutable per-crawl settings shared read-only by every worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Host (and non-default port) of the seed URL
    pub original_host: String,

    /// Whether links to other hosts may be fetched
    pub allow_external_domains: bool,

    /// Remaining depth given to the seed task
    pub max_depth: i32,

    /// Number of workers in the pool
    pub worker_count: usize,

    /// Bound on simultaneous fetches
    pub max_concurrent_requests: usize,
}

impl CrawlConfig {
    /// Binds crawler settings to a parsed seed URL
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::SeedWithoutHost` when the seed has no host to
    /// scope the crawl to (e.g. `mailto:` or `file:` URLs).
    pub fn for_seed(seed: &Url, crawler: &CrawlerConfig) -> Result<Self, CrawlError> {
        let original_host = host_key(seed).ok_or_else(|| CrawlError::SeedWithoutHost {
            url: seed.to_string(),
        })?;

        Ok(Self {
            original_host,
            allow_external_domains: crawler.external_domains,
            max_depth: crawler.max_depth,
            worker_count: crawler.workers,
            max_concurrent_requests: crawler.request_limit(),
        })
    }
}
