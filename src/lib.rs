//! Linkcrawl: a concurrent, depth-bounded link crawler
//!
//! Starting from a seed URL, this crate fetches pages, extracts outbound links,
//! and follows them up to a fixed depth. Every unique link is emitted once,
//! no URL is fetched twice, and the number of in-flight requests is bounded.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only failures that abort the whole crawl end up here. Problems with an
/// individual URL are logged by the worker that hit them and never propagate.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid start URL {url}: {source}")]
    InvalidSeed {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Start URL {url} has no host")]
    SeedWithoutHost { url: String },

    #[error("Failed to build membership filter: {0}")]
    Filter(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Outstanding work counter already drained")]
    CounterDrained,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors returned by a link source for a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body: {source}")]
    Body { url: String, source: reqwest::Error },
}

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{run_crawl, Coordinator, HttpFetcher, LinkSource};
pub use output::{CrawlStatistics, LinkSink, MemorySink, StdoutSink};
pub use state::CrawlPhase;
