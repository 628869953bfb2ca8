//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of a whole crawl run, from seeding through
//!   draining the worker pool

mod crawl_phase;

// Re-export main types
pub use crawl_phase::CrawlPhase;
