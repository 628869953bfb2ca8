//! Configuration module for Linkcrawl
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. The merged result is validated once before a crawl
//! starts and turned into an immutable [`CrawlConfig`] bound to the seed URL.
//!
//! # Example
//!
//! ```no_run
//! use linkcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkcrawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, CrawlerConfig, FilterConfig, HttpConfig};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
