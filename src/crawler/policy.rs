//! Crawl policy: decides whether a URL may be fetched
//!
//! The policy is a pure function of the candidate URL, its depth budget and
//! the shared [`CrawlConfig`]. Passing it is necessary but not sufficient for
//! a fetch; the processed filter has the final say.

use crate::config::CrawlConfig;
use crate::url::{host_key, is_http_scheme};
use thiserror::Error;
use url::Url;

/// Reason a candidate URL will not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("depth budget exhausted ({0})")]
    DepthExhausted(i32),

    #[error("invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("host '{host}' is outside the crawl scope")]
    ExternalHost { host: String },
}

impl Rejection {
    /// Returns true for rejections worth reporting to the operator
    ///
    /// Scheme and scope rejections are routine on every page and are only
    /// traced.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }
}

/// Checks a candidate URL and returns it parsed if it may be fetched
///
/// # Rules
///
/// 1. `remaining_depth` must not be negative
/// 2. The URL must parse
/// 3. The scheme must be `http` or `https`
/// 4. Unless external domains are allowed, the host (with any non-default
///    port) must equal the seed's host
///
/// # Example
///
/// ```
/// use linkcrawl::config::CrawlConfig;
/// use linkcrawl::crawler::policy::check;
///
/// let config = CrawlConfig {
///     original_host: "example.org".to_string(),
///     allow_external_domains: false,
///     max_depth: 1,
///     worker_count: 1,
///     max_concurrent_requests: 1,
/// };
/// assert!(check("https://example.org/about", 0, &config).is_ok());
/// assert!(check("https://other.org/", 0, &config).is_err());
/// ```
pub fn check(candidate: &str, remaining_depth: i32, config: &CrawlConfig) -> Result<Url, Rejection> {
    if remaining_depth < 0 {
        return Err(Rejection::DepthExhausted(remaining_depth));
    }

    let url = Url::parse(candidate).map_err(|e| Rejection::InvalidUrl {
        reason: e.to_string(),
    })?;

    if !is_http_scheme(url.scheme()) {
        return Err(Rejection::UnsupportedScheme(url.scheme().to_string()));
    }

    if !config.allow_external_domains {
        let host = host_key(&url).unwrap_or_default();
        if host != config.original_host {
            return Err(Rejection::ExternalHost { host });
        }
    }

    Ok(url)
}

/// Returns true if `candidate` passes every policy rule
pub fn is_eligible(candidate: &str, remaining_depth: i32, config: &CrawlConfig) -> bool {
    check(candidate, remaining_depth, config).is_ok()
}
