//! Crawler module for concurrent link discovery
//!
//! This module contains the core crawling logic, including:
//! - The task queue and outstanding-work counter behind termination
//! - Membership filters for fetch and output de-duplication
//! - The crawl policy (depth, scheme and domain scope)
//! - The worker pool and the coordinator that drives it
//! - The HTTP fetch-and-extract collaborator

mod coordinator;
mod counter;
mod fetcher;
mod filter;
mod parser;
pub mod policy;
mod queue;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use counter::{CompletionGuard, WorkCounter};
pub use fetcher::{build_http_client, HttpFetcher, LinkSource};
pub use filter::MembershipFilter;
pub use parser::extract_links;
pub use policy::{is_eligible, Rejection};
pub use queue::{QueueClosed, Task, TaskQueue};
