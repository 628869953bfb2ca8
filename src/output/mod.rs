//! Output module for discovered links and crawl statistics
//!
//! This module handles:
//! - Emitting each newly discovered link to a sink (stdout by default)
//! - Recording crawl counters while workers run
//! - Printing a summary once the crawl has finished

pub mod stats;
mod traits;

pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
pub use traits::{LinkSink, MemorySink, StdoutSink};
