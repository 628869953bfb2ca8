//! Link sink trait and implementations
//!
//! Workers call [`LinkSink::emit`] at most once per unique link. Sinks must be
//! safe to call from every worker at the same time. A write error means the
//! output is gone and the crawl winds down without fetching anything else.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Destination for discovered links
pub trait LinkSink: Send + Sync {
    /// Records a single discovered link
    fn emit(&self, link: &str) -> io::Result<()>;
}

/// Writes one link per line to standard output
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LinkSink for StdoutSink {
    fn emit(&self, link: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", link)
    }
}

/// Collects links in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    links: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every link emitted so far, in emission order
    pub fn links(&self) -> Vec<String> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many times `link` was emitted
    pub fn count(&self, link: &str) -> usize {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.as_str() == link)
            .count()
    }
}

impl LinkSink for MemorySink {
    fn emit(&self, link: &str) -> io::Result<()> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(link.to_string());
        Ok(())
    }
}
