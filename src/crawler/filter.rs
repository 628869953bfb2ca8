//! Approximate membership filter for de-duplication
//!
//! A Bloom filter never forgets a key it has seen, so a negative answer
//! guarantees the key is new. A positive answer may be a false positive, in
//! which case a genuinely new URL is skipped. Skipping is safe; fetching or
//! printing a URL twice is not.

use crate::config::FilterConfig;
use crate::CrawlError;
use bloomfilter::Bloom;
use std::sync::{Mutex, PoisonError};

/// Thread-safe "insert and report whether it was new" set
///
/// Each filter has its own lock, held only for the test-and-insert pair.
pub struct MembershipFilter {
    name: &'static str,
    bloom: Mutex<Bloom<str>>,
}

impl MembershipFilter {
    /// Creates a filter sized for `capacity` keys at `false_positive_rate`
    ///
    /// Every filter is built with its own random hash seed, so two filters
    /// with the same sizing are still independent.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Filter` if the sizing is rejected (zero capacity or
    /// a rate outside `(0, 1)`).
    pub fn new(
        name: &'static str,
        capacity: usize,
        false_positive_rate: f64,
    ) -> Result<Self, CrawlError> {
        if capacity == 0 {
            return Err(CrawlError::Filter(format!("{} filter: capacity must be >= 1", name)));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(CrawlError::Filter(format!(
                "{} filter: false positive rate {} outside (0, 1)",
                name, false_positive_rate
            )));
        }

        let bloom: Bloom<str> = Bloom::new_for_fp_rate(capacity, false_positive_rate)
            .map_err(|e| CrawlError::Filter(format!("{} filter: {}", name, e)))?;

        tracing::debug!(
            filter = name,
            capacity,
            false_positive_rate,
            bits = bloom.len(),
            hashes = bloom.number_of_hash_functions(),
            "Membership filter sized"
        );

        Ok(Self {
            name,
            bloom: Mutex::new(bloom),
        })
    }

    /// Creates a filter from configuration
    pub fn from_config(name: &'static str, config: &FilterConfig) -> Result<Self, CrawlError> {
        Self::new(name, config.capacity, config.false_positive_rate)
    }

    /// Records `key` and returns true if it was not already present
    ///
    /// The membership test and the insert happen under one lock acquisition,
    /// so two concurrent callers can never both see the same key as new.
    pub fn insert_if_absent(&self, key: &str) -> bool {
        let mut bloom = self.bloom.lock().unwrap_or_else(PoisonError::into_inner);
        !bloom.check_and_set(key)
    }

    /// Returns true if `key` may have been inserted
    pub fn contains(&self, key: &str) -> bool {
        self.bloom
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(key)
    }
}

impl std::fmt::Debug for MembershipFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
