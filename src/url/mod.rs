//! URL handling module for Linkcrawl
//!
//! This module provides host extraction for domain scoping and the key used
//! to de-duplicate fetches.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, host_key};
pub use normalize::{fetch_key, is_http_scheme};
